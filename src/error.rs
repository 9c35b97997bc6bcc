//! Error kinds
//!
//! Nothing on the per-frame path is fatal: a dropped animation or an empty
//! pick is a normal outcome. The tick-path kinds below exist so callers can
//! report what happened; they are logged and degraded to no-ops inside the
//! crate. Only configuration and name parsing return them as `Err`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A tween was scheduled with a non-positive duration; it resolves at once
    #[error("invalid tween duration: {0} ms")]
    InvalidDuration(f64),

    /// A tween or pick entry refers to a node that left the scene
    #[error("stale node reference")]
    StaleNodeReference,

    /// A pick found nothing
    #[error("no intersection")]
    NoIntersection,

    /// A trigger arrived while a transition was in flight
    #[error("interaction rejected while busy")]
    RejectedWhileBusy,

    /// An easing name that does not map to any supported curve
    #[error("unknown easing: {0}")]
    UnknownEasing(String),

    /// A property name that does not map to any animatable property
    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// A configuration document that does not parse or validate
    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_yaml::Error> for MotionError {
    fn from(err: serde_yaml::Error) -> Self {
        MotionError::Config(format!("YAML parse error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, MotionError>;
