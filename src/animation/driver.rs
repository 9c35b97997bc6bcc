//! Frame-driven tween driver
//!
//! Owns every running tween and advances them against a [`SceneGraph`]
//! once per frame:
//! - start time is taken on a tween's first advance, not when it is started
//! - a new tween on a node cancels running tweens touching the same
//!   components (no callbacks fire for the cancelled ones)
//! - tweens whose node left the scene are dropped without a callback
//! - completion callbacks run after all tweens were advanced; tweens they
//!   start get their first advance on the next frame and inherit the
//!   finished tween's interaction transition

use super::tween::{Commands, OnComplete, Step, Tween, TweenId, TweenSpec};
use crate::error::MotionError;
use crate::scene::{Footprint, NodeId, SceneGraph};

#[derive(Debug, Default)]
pub struct AnimationDriver {
    /// Running tweens in start order; callbacks fire in this order
    tweens: Vec<Tween>,
    next_id: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween. It takes over the components it touches from any
    /// tween already running on the same node.
    pub fn start(&mut self, spec: TweenSpec) -> TweenId {
        let footprint = spec.footprint();
        let node = spec.node;
        let before = self.tweens.len();
        self.tweens
            .retain(|t| !(t.node() == node && t.channel().footprint().overlaps(&footprint)));
        let superseded = before - self.tweens.len();
        if superseded > 0 {
            log::trace!("{} tween(s) on {:?} superseded", superseded, node);
        }

        self.next_id += 1;
        let id = TweenId(self.next_id);
        self.tweens.push(Tween::new(id, spec));
        id
    }

    /// Advance every tween to `now_ms`.
    ///
    /// Returns the delayed starts and settle request issued by completion
    /// callbacks; their immediate starts are already queued on the driver.
    pub fn advance<S: SceneGraph + ?Sized>(&mut self, now_ms: f64, scene: &mut S) -> Commands {
        let mut finished: Vec<(OnComplete, Option<u64>)> = Vec::new();

        self.tweens.retain_mut(|tween| match tween.step(now_ms, scene) {
            Step::Running => true,
            Step::Finished => {
                if let Some(callback) = tween.on_complete.take() {
                    finished.push((callback, tween.transition()));
                }
                false
            }
            Step::Stale => {
                log::trace!("dropping tween {:?}: {}", tween.id(), MotionError::StaleNodeReference);
                false
            }
        });

        let mut commands = Commands::new();
        for (callback, transition) in finished {
            let mark = commands.mark();
            callback(&mut commands);
            if let Some(transition) = transition {
                commands.adopt(mark, transition);
            }
        }
        for spec in commands.take_tweens() {
            self.start(spec);
        }
        commands
    }

    /// Cancel one tween without running its callback
    pub fn cancel(&mut self, id: TweenId) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.id() != id);
        before != self.tweens.len()
    }

    /// Cancel every tween on `node`; returns how many were running
    pub fn cancel_node(&mut self, node: NodeId) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.node() != node);
        before - self.tweens.len()
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }

    pub fn is_animating(&self, node: NodeId) -> bool {
        self.tweens.iter().any(|t| t.node() == node)
    }

    /// Whether any running tween belongs to interaction `transition`
    pub(crate) fn carries(&self, transition: u64) -> bool {
        self.tweens.iter().any(|t| t.transition() == Some(transition))
    }

    pub fn get(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.iter().find(|t| t.id() == id)
    }

    /// The running tween on `node` that touches `footprint`, if any
    pub fn tween_for(&self, node: NodeId, footprint: Footprint) -> Option<&Tween> {
        self.tweens
            .iter()
            .find(|t| t.node() == node && t.channel().footprint().overlaps(&footprint))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tween> {
        self.tweens.iter()
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}
