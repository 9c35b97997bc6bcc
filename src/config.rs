//! Stage configuration loaded from YAML
//!
//! ```yaml
//! default_easing: quartInOut
//! stagger_ms: 100
//! ping_pong:
//!   min_ms: 2000
//!   max_ms: 2800
//! pick_epsilon: 0.01
//! seed: 42
//! camera:
//!   fov_y_deg: 75
//!   position: { x: 0, y: 0, z: 5 }
//! ```
//!
//! Every field is optional.

use serde::{Deserialize, Serialize};

use crate::animation::{DurationRange, Easing};
use crate::error::{MotionError, Result};
use crate::math::Vec3;
use crate::scene::Camera;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 60.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(0.0, 0.0, 4.0),
            target: Vec3::ZERO,
        }
    }
}

impl CameraConfig {
    pub fn build(&self, aspect: f32) -> Camera {
        Camera::perspective(self.fov_y_deg, aspect, self.near, self.far).looking_at(self.position, self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Easing used when a tween does not name one
    pub default_easing: Easing,
    /// Offset between successive starts of a staggered group
    pub stagger_ms: f64,
    /// Range each ping-pong cycle's duration is drawn from
    pub ping_pong: DurationRange,
    /// Tolerance for front-slot and rear-face checks
    pub pick_epsilon: f32,
    pub seed: u64,
    pub camera: CameraConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            default_easing: Easing::QuartInOut,
            stagger_ms: 100.0,
            ping_pong: DurationRange::default(),
            pick_epsilon: 0.01,
            seed: 42,
            camera: CameraConfig::default(),
        }
    }
}

impl MotionConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: MotionConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.stagger_ms.is_finite() && self.stagger_ms > 0.0) {
            return Err(MotionError::Config(format!("stagger_ms must be positive, got {}", self.stagger_ms)));
        }
        let range = &self.ping_pong;
        if !(range.min_ms.is_finite() && range.max_ms.is_finite()) || range.min_ms < 0.0 {
            return Err(MotionError::Config("ping_pong durations must be finite and non-negative".to_string()));
        }
        if range.min_ms > range.max_ms {
            return Err(MotionError::Config(format!(
                "ping_pong.min_ms ({}) exceeds max_ms ({})",
                range.min_ms, range.max_ms
            )));
        }
        if !(self.pick_epsilon > 0.0) {
            return Err(MotionError::Config(format!("pick_epsilon must be positive, got {}", self.pick_epsilon)));
        }
        let cam = &self.camera;
        if !(cam.fov_y_deg > 0.0 && cam.fov_y_deg < 180.0) {
            return Err(MotionError::Config(format!("camera.fov_y_deg out of range: {}", cam.fov_y_deg)));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(MotionError::Config(format!(
                "camera clip planes invalid: near {} far {}",
                cam.near, cam.far
            )));
        }
        Ok(())
    }
}
