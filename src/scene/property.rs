use std::str::FromStr;

use crate::error::MotionError;
use crate::math::{Axis, Mat4, Vec3};

/// A single animatable number on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarProperty {
    Position(Axis),
    Rotation(Axis),
    Scale(Axis),
    /// All three scale axes driven together
    UniformScale,
    Opacity,
}

/// Accepts `position.x`, `rotation.y`, `scale.z`, `scale` (uniform) and
/// `opacity`, case-insensitively
impl FromStr for ScalarProperty {
    type Err = MotionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lower = name.trim().to_ascii_lowercase();
        let unknown = || MotionError::UnknownProperty(name.to_string());

        let (field, axis) = match lower.split_once('.') {
            Some((field, axis)) => (field, Some(axis)),
            None => (lower.as_str(), None),
        };
        let axis = match axis {
            Some("x") => Some(Axis::X),
            Some("y") => Some(Axis::Y),
            Some("z") => Some(Axis::Z),
            Some(_) => return Err(unknown()),
            None => None,
        };

        match (field, axis) {
            ("position", Some(a)) => Ok(ScalarProperty::Position(a)),
            ("rotation", Some(a)) => Ok(ScalarProperty::Rotation(a)),
            ("scale", Some(a)) => Ok(ScalarProperty::Scale(a)),
            ("scale", None) => Ok(ScalarProperty::UniformScale),
            ("opacity", None) => Ok(ScalarProperty::Opacity),
            _ => Err(unknown()),
        }
    }
}

/// A three-component animatable value on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorProperty {
    Position,
    Rotation,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Position,
    Rotation,
    Scale,
    Opacity,
}

/// Which components of a node a property touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footprint {
    pub field: Field,
    pub axes: u8,
}

impl Footprint {
    pub fn overlaps(&self, other: &Footprint) -> bool {
        self.field == other.field && (self.axes & other.axes) != 0
    }
}

const ALL_AXES: u8 = 0b111;

impl ScalarProperty {
    pub fn footprint(&self) -> Footprint {
        match *self {
            ScalarProperty::Position(a) => Footprint { field: Field::Position, axes: a.bit() },
            ScalarProperty::Rotation(a) => Footprint { field: Field::Rotation, axes: a.bit() },
            ScalarProperty::Scale(a) => Footprint { field: Field::Scale, axes: a.bit() },
            ScalarProperty::UniformScale => Footprint { field: Field::Scale, axes: ALL_AXES },
            ScalarProperty::Opacity => Footprint { field: Field::Opacity, axes: ALL_AXES },
        }
    }
}

impl VectorProperty {
    pub fn footprint(&self) -> Footprint {
        let field = match self {
            VectorProperty::Position => Field::Position,
            VectorProperty::Rotation => Field::Rotation,
            VectorProperty::Scale => Field::Scale,
        };
        Footprint { field, axes: ALL_AXES }
    }
}

/// Local position, Euler rotation (radians) and scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_trs(self.position, self.rotation, self.scale)
    }

    pub fn vector(&self, property: VectorProperty) -> Vec3 {
        match property {
            VectorProperty::Position => self.position,
            VectorProperty::Rotation => self.rotation,
            VectorProperty::Scale => self.scale,
        }
    }

    pub fn set_vector(&mut self, property: VectorProperty, value: Vec3) {
        match property {
            VectorProperty::Position => self.position = value,
            VectorProperty::Rotation => self.rotation = value,
            VectorProperty::Scale => self.scale = value,
        }
    }

    /// Scalar read; `None` for properties that do not live on the transform
    pub fn scalar(&self, property: ScalarProperty) -> Option<f32> {
        match property {
            ScalarProperty::Position(a) => Some(self.position.get(a)),
            ScalarProperty::Rotation(a) => Some(self.rotation.get(a)),
            ScalarProperty::Scale(a) => Some(self.scale.get(a)),
            ScalarProperty::UniformScale => Some(self.scale.x),
            ScalarProperty::Opacity => None,
        }
    }

    pub fn set_scalar(&mut self, property: ScalarProperty, value: f32) -> bool {
        match property {
            ScalarProperty::Position(a) => self.position.set(a, value),
            ScalarProperty::Rotation(a) => self.rotation.set(a, value),
            ScalarProperty::Scale(a) => self.scale.set(a, value),
            ScalarProperty::UniformScale => self.scale = Vec3::splat(value),
            ScalarProperty::Opacity => return false,
        }
        true
    }
}
