//! Easing functions for tweens
//!
//! Names follow the usual web conventions so scene descriptions can pick a
//! curve by string: `quartInOut`, `power2.out`, `cubicOut`, `linear`, ...

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Easing function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    /// Linear interpolation
    Linear,
    /// Quartic ease-in-out: `8t⁴` then `1 - (-2t+2)⁴/2`
    #[default]
    QuartInOut,
    /// Quadratic ease-in-out
    QuadInOut,
    /// `t^n`
    PowerIn(u8),
    /// `1 - (1-t)^n`
    PowerOut(u8),
    /// Overshoots slightly before settling
    BackOut,
}

/// Apply easing function to a value t in range [0, 1].
///
/// Input is clamped, and the endpoints map to exactly 0 and 1.
pub fn ease(t: f32, easing: Easing) -> f32 {
    if t.is_nan() || t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    match easing {
        Easing::Linear => t,
        Easing::QuartInOut => {
            if t < 0.5 {
                8.0 * t * t * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
            }
        }
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
            }
        }
        Easing::PowerIn(n) => t.powi(n.max(1) as i32),
        Easing::PowerOut(n) => 1.0 - (1.0 - t).powi(n.max(1) as i32),
        Easing::BackOut => {
            let c1 = 1.70158;
            let c3 = c1 + 1.0;
            1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
        }
    }
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        ease(t, self)
    }
}

impl FromStr for Easing {
    type Err = MotionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lower = name.trim().to_ascii_lowercase();

        let easing = match lower.as_str() {
            "linear" | "none" => Easing::Linear,
            "quartinout" | "easeinoutquart" => Easing::QuartInOut,
            "quadinout" | "easeinout" => Easing::QuadInOut,
            "quadin" | "easein" => Easing::PowerIn(2),
            "cubicin" => Easing::PowerIn(3),
            "quartin" => Easing::PowerIn(4),
            "quintin" => Easing::PowerIn(5),
            "quadout" | "easeout" => Easing::PowerOut(2),
            "cubicout" => Easing::PowerOut(3),
            "quartout" => Easing::PowerOut(4),
            "quintout" => Easing::PowerOut(5),
            "backout" => Easing::BackOut,
            other => return parse_power(other).ok_or_else(|| MotionError::UnknownEasing(name.to_string())),
        };

        Ok(easing)
    }
}

/// `power{k}.in|out|inout` where power k has exponent k + 1
fn parse_power(name: &str) -> Option<Easing> {
    let rest = name.strip_prefix("power")?;
    let (level, direction) = match rest.split_once('.') {
        Some((level, direction)) => (level, direction),
        None => (rest, "out"),
    };
    let level: u8 = level.parse().ok()?;
    let exponent = level.checked_add(1)?;

    match (level, direction) {
        (0, _) => Some(Easing::Linear),
        (_, "in") => Some(Easing::PowerIn(exponent)),
        (_, "out") => Some(Easing::PowerOut(exponent)),
        (1, "inout") => Some(Easing::QuadInOut),
        (3, "inout") => Some(Easing::QuartInOut),
        _ => None,
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "linear"),
            Easing::QuartInOut => write!(f, "quartInOut"),
            Easing::QuadInOut => write!(f, "quadInOut"),
            // exponents 0 and 1 are both a straight line
            Easing::PowerIn(0 | 1) | Easing::PowerOut(0 | 1) => write!(f, "linear"),
            Easing::PowerIn(n) => write!(f, "power{}.in", n - 1),
            Easing::PowerOut(n) => write!(f, "power{}.out", n - 1),
            Easing::BackOut => write!(f, "backOut"),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}
