use super::matrix::euler_xyz;
use super::Vec3;

/// Unit quaternion for orientations along spherical paths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalize();
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`
    pub fn from_unit_vectors(from: Vec3, to: Vec3) -> Self {
        let r = from.dot(&to) + 1.0;

        let q = if r < 1e-6 {
            // opposite vectors: rotate half a turn around any orthogonal axis
            if from.x.abs() > from.z.abs() {
                Self::new(-from.y, from.x, 0.0, 0.0)
            } else {
                Self::new(0.0, -from.z, from.y, 0.0)
            }
        } else {
            let c = from.cross(&to);
            Self::new(c.x, c.y, c.z, r)
        };

        q.normalize()
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
        } else {
            Self::IDENTITY
        }
    }

    /// Spherical interpolation along the shorter arc
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return *other;
        }

        let mut cos_half = self.dot(other);
        let mut end = *other;
        if cos_half < 0.0 {
            cos_half = -cos_half;
            end = Self::new(-end.x, -end.y, -end.z, -end.w);
        }

        if cos_half > 0.9995 {
            return Self::new(
                self.x + (end.x - self.x) * t,
                self.y + (end.y - self.y) * t,
                self.z + (end.z - self.z) * t,
                self.w + (end.w - self.w) * t,
            )
            .normalize();
        }

        let half = cos_half.acos();
        let sin_half = half.sin();
        let a = ((1.0 - t) * half).sin() / sin_half;
        let b = (t * half).sin() / sin_half;

        Self::new(
            self.x * a + end.x * b,
            self.y * a + end.y * b,
            self.z * a + end.z * b,
            self.w * a + end.w * b,
        )
    }

    /// Rotate a vector by this quaternion
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(&v).scale(2.0);
        v + t.scale(self.w) + q.cross(&t)
    }

    /// Euler angles (radians) in the X-then-Y-then-Z order used by node rotations
    pub fn to_euler_xyz(&self) -> Vec3 {
        let Self { x, y, z, w } = *self;

        let m11 = 1.0 - 2.0 * (y * y + z * z);
        let m12 = 2.0 * (x * y - w * z);
        let m13 = 2.0 * (x * z + w * y);
        let m22 = 1.0 - 2.0 * (x * x + z * z);
        let m23 = 2.0 * (y * z - w * x);
        let m32 = 2.0 * (y * z + w * x);
        let m33 = 1.0 - 2.0 * (x * x + y * y);

        euler_xyz(m11, m12, m13, m22, m23, m32, m33)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Mat4;

    fn near(a: Vec3, b: Vec3) -> bool {
        a.distance(&b) < 0.0001
    }

    #[test]
    fn test_from_unit_vectors_maps_source_to_target() {
        let from = Vec3::FORWARD;
        let to = Vec3::new(1.0, 1.0, 0.0).normalize();
        let q = Quat::from_unit_vectors(from, to);
        assert!(near(q.rotate(from), to));
    }

    #[test]
    fn test_from_unit_vectors_opposite() {
        let q = Quat::from_unit_vectors(Vec3::FORWARD, -Vec3::FORWARD);
        assert!(near(q.rotate(Vec3::FORWARD), -Vec3::FORWARD));
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_2);
        assert_eq!(a.slerp(&b, 0.0), a);
        assert_eq!(a.slerp(&b, 1.0), b);

        let mid = a.slerp(&b, 0.5);
        let expected = Quat::from_axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_4);
        assert!((mid.dot(&expected).abs() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_euler_matches_matrix_rotation() {
        let q = Quat::from_axis_angle(Vec3::new(0.3, 1.0, -0.2), 0.8);
        let euler = q.to_euler_xyz();
        let m = Mat4::from_trs(Vec3::ZERO, euler, Vec3::ONE);
        for v in [Vec3::RIGHT, Vec3::UP, Vec3::FORWARD] {
            assert!(near(m.transform_direction(v), q.rotate(v)));
        }
    }
}
