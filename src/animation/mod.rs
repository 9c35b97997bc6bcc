//! Tweening for scene nodes
//!
//! Tweens are described with [`TweenSpec`], started on an [`AnimationDriver`]
//! and advanced once per frame. Follow-up work (next loop cycle, next
//! sequence step, staggered starts) is requested through [`Commands`] from
//! completion callbacks.

mod driver;
mod easing;
mod looping;
mod sequence;
mod tween;

pub use driver::AnimationDriver;
pub use easing::{ease, Easing};
pub use looping::{ping_pong, route_loop, DurationRange};
pub use sequence::Sequence;
pub use tween::{Channel, Commands, Delayed, OnComplete, Path, Tween, TweenId, TweenSpec, DEFAULT_DURATION_MS};
