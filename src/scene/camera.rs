use crate::math::{Mat4, Vec3};

/// Pixel size of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Screen pixels (origin top-left, y down) to normalized device
    /// coordinates in [-1, 1] with y up
    pub fn to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        (x / w * 2.0 - 1.0, -(y / h * 2.0 - 1.0))
    }

    pub fn from_ndc(&self, ndc_x: f32, ndc_y: f32) -> (f32, f32) {
        ((ndc_x + 1.0) * 0.5 * self.width, (1.0 - ndc_y) * 0.5 * self.height)
    }
}

/// Half-line used for picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction.scale(t)
    }

    /// Same ray expressed through `m` (direction is not renormalized, so ray
    /// parameters stay comparable across spaces)
    pub fn transformed(&self, m: &Mat4) -> Ray {
        Ray {
            origin: m.transform_point(self.origin),
            direction: m.transform_direction(self.direction),
        }
    }
}

/// Perspective camera looking at a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(60.0, 1.0, 0.1, 100.0).looking_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO)
    }
}

impl Camera {
    pub fn perspective(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov_y: fov_y_deg.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn looking_at(mut self, position: Vec3, target: Vec3) -> Self {
        self.position = position;
        self.target = target;
        self
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Ray from the eye through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);

        let half_h = (self.fov_y * 0.5).tan();
        let half_w = half_h * self.aspect;

        let direction = (forward + right.scale(ndc_x * half_w) + up.scale(ndc_y * half_h)).normalize();
        Ray::new(self.position, direction)
    }

    pub fn ray_from_screen(&self, x: f32, y: f32, viewport: Viewport) -> Ray {
        let (ndc_x, ndc_y) = viewport.to_ndc(x, y);
        self.ray_from_ndc(ndc_x, ndc_y)
    }

    /// World point to screen pixels; `None` when the point is behind the eye
    pub fn project(&self, world: Vec3, viewport: Viewport) -> Option<(f32, f32)> {
        let view_proj = self.projection_matrix().mul(&self.view_matrix());
        let [x, y, _, w] = view_proj.transform_homogeneous(world);
        if w <= f32::EPSILON {
            return None;
        }
        Some(viewport.from_ndc(x / w, y / w))
    }
}
