//! Tween descriptions and the per-tween state the driver advances

use std::fmt;

use super::easing::Easing;
use super::sequence::Sequence;
use crate::error::MotionError;
use crate::interaction::InteractionState;
use crate::math::{geodesic_point, Vec3};
use crate::scene::{Footprint, NodeId, ScalarProperty, SceneGraph, VectorProperty};

/// Duration used when a spec does not set one
pub const DEFAULT_DURATION_MS: f64 = 500.0;

/// Completion callback. Runs once, inside the tick that finished the tween.
pub type OnComplete = Box<dyn FnOnce(&mut Commands)>;

/// Identifier handed out by the driver for each started tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub(crate) u64);

/// How a vector value travels between its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Path {
    /// Straight line, component-wise
    #[default]
    Linear,
    /// Great circle around the origin, radius interpolated linearly
    Geodesic,
}

/// The property being animated and its endpoints.
///
/// A missing `from` is read from the node on the tween's first advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channel {
    Scalar {
        property: ScalarProperty,
        from: Option<f32>,
        to: f32,
    },
    Vector {
        property: VectorProperty,
        from: Option<Vec3>,
        to: Vec3,
        path: Path,
    },
}

impl Channel {
    pub fn footprint(&self) -> Footprint {
        match self {
            Channel::Scalar { property, .. } => property.footprint(),
            Channel::Vector { property, .. } => property.footprint(),
        }
    }

    /// Fill in a missing start value from the scene. False if it cannot be read.
    fn resolve_from<S: SceneGraph + ?Sized>(&mut self, node: NodeId, scene: &S) -> bool {
        match self {
            Channel::Scalar { property, from, .. } => {
                if from.is_none() {
                    *from = scene.read_scalar(node, *property);
                }
                from.is_some()
            }
            Channel::Vector { property, from, .. } => {
                if from.is_none() {
                    *from = scene.read_vector(node, *property);
                }
                from.is_some()
            }
        }
    }

    /// Write the value at linear progress `p` (eased by `easing`) into the scene
    fn write<S: SceneGraph + ?Sized>(&self, node: NodeId, p: f32, easing: Easing, scene: &mut S) -> bool {
        let eased = easing.apply(p);
        match *self {
            Channel::Scalar { property, from, to } => {
                let Some(from) = from else { return false };
                let value = if p >= 1.0 {
                    to
                } else if p <= 0.0 {
                    from
                } else {
                    from + (to - from) * eased
                };
                scene.write_scalar(node, property, value)
            }
            Channel::Vector { property, from, to, path } => {
                let Some(from) = from else { return false };
                let value = if p >= 1.0 {
                    to
                } else if p <= 0.0 {
                    from
                } else {
                    match path {
                        Path::Linear => from.lerp(&to, eased),
                        Path::Geodesic => geodesic_point(from, to, eased),
                    }
                };
                scene.write_vector(node, property, value)
            }
        }
    }
}

/// Everything needed to start a tween
pub struct TweenSpec {
    pub node: NodeId,
    pub channel: Channel,
    pub duration_ms: f64,
    pub easing: Easing,
    pub(crate) on_complete: Option<OnComplete>,
    /// Interaction transition this start belongs to, if any
    pub(crate) transition: Option<u64>,
}

impl TweenSpec {
    pub fn scalar(node: NodeId, property: ScalarProperty, from: f32, to: f32) -> Self {
        Self::with_channel(node, Channel::Scalar { property, from: Some(from), to })
    }

    /// Tween from whatever value the node holds when the tween begins
    pub fn scalar_to(node: NodeId, property: ScalarProperty, to: f32) -> Self {
        Self::with_channel(node, Channel::Scalar { property, from: None, to })
    }

    pub fn vector(node: NodeId, property: VectorProperty, from: Vec3, to: Vec3) -> Self {
        Self::with_channel(
            node,
            Channel::Vector { property, from: Some(from), to, path: Path::Linear },
        )
    }

    pub fn vector_to(node: NodeId, property: VectorProperty, to: Vec3) -> Self {
        Self::with_channel(node, Channel::Vector { property, from: None, to, path: Path::Linear })
    }

    fn with_channel(node: NodeId, channel: Channel) -> Self {
        Self {
            node,
            channel,
            duration_ms: DEFAULT_DURATION_MS,
            easing: Easing::default(),
            on_complete: None,
            transition: None,
        }
    }

    pub fn duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Travel along the great circle instead of a straight line (vector tweens only)
    pub fn geodesic(mut self) -> Self {
        if let Channel::Vector { path, .. } = &mut self.channel {
            *path = Path::Geodesic;
        }
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut Commands) + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn has_callback(&self) -> bool {
        self.on_complete.is_some()
    }

    pub fn footprint(&self) -> Footprint {
        self.channel.footprint()
    }

    /// Chain `next` to run after this spec's own callback, if any
    pub(crate) fn then<F>(mut self, next: F) -> Self
    where
        F: FnOnce(&mut Commands) + 'static,
    {
        let previous = self.on_complete.take();
        self.on_complete(move |cmds| {
            if let Some(previous) = previous {
                previous(cmds);
            }
            next(cmds);
        })
    }
}

impl fmt::Debug for TweenSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenSpec")
            .field("node", &self.node)
            .field("channel", &self.channel)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Outcome of advancing one tween
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Running,
    Finished,
    Stale,
}

/// A running tween
pub struct Tween {
    id: TweenId,
    node: NodeId,
    channel: Channel,
    duration_ms: f64,
    easing: Easing,
    start_ms: Option<f64>,
    transition: Option<u64>,
    pub(crate) on_complete: Option<OnComplete>,
}

impl Tween {
    pub(crate) fn new(id: TweenId, spec: TweenSpec) -> Self {
        Self {
            id,
            node: spec.node,
            channel: spec.channel,
            duration_ms: spec.duration_ms,
            easing: spec.easing,
            start_ms: None,
            transition: spec.transition,
            on_complete: spec.on_complete,
        }
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Clock time of the first advance, `None` until then
    pub fn start_ms(&self) -> Option<f64> {
        self.start_ms
    }

    pub(crate) fn transition(&self) -> Option<u64> {
        self.transition
    }

    /// Zero, negative, NaN and infinite durations finish on the first advance
    fn resolves_at_once(&self) -> bool {
        !(self.duration_ms.is_finite() && self.duration_ms > 0.0)
    }

    /// Linear progress in [0, 1] at `now_ms`
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.resolves_at_once() {
            return 1.0;
        }
        match self.start_ms {
            Some(start) => ((now_ms - start) / self.duration_ms).clamp(0.0, 1.0) as f32,
            None => 0.0,
        }
    }

    pub(crate) fn step<S: SceneGraph + ?Sized>(&mut self, now_ms: f64, scene: &mut S) -> Step {
        if !scene.contains(self.node) {
            return Step::Stale;
        }
        if self.start_ms.is_none() {
            self.start_ms = Some(now_ms);
            if self.resolves_at_once() {
                log::debug!("tween {:?} resolves at once: {}", self.id, MotionError::InvalidDuration(self.duration_ms));
            }
        }
        if !self.channel.resolve_from(self.node, &*scene) {
            return Step::Stale;
        }

        let p = self.progress(now_ms);
        if !self.channel.write(self.node, p, self.easing, scene) {
            return Step::Stale;
        }

        if p >= 1.0 {
            Step::Finished
        } else {
            Step::Running
        }
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("channel", &self.channel)
            .field("duration_ms", &self.duration_ms)
            .field("start_ms", &self.start_ms)
            .finish()
    }
}

/// A tween start postponed by `delay_ms`
#[derive(Debug)]
pub struct Delayed {
    pub delay_ms: f64,
    pub spec: TweenSpec,
}

/// Follow-up work requested by completion callbacks and trigger plans
#[derive(Debug, Default)]
pub struct Commands {
    tweens: Vec<TweenSpec>,
    delayed: Vec<Delayed>,
    settle: Option<InteractionState>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween (first advanced on the next tick when requested from a callback)
    pub fn tween(&mut self, spec: TweenSpec) {
        self.tweens.push(spec);
    }

    /// Start a tween once `delay_ms` has passed
    pub fn tween_after(&mut self, delay_ms: f64, spec: TweenSpec) {
        self.delayed.push(Delayed { delay_ms: delay_ms.max(0.0), spec });
    }

    /// Offset each spec's start by `index * step_ms`
    pub fn stagger<I>(&mut self, specs: I, step_ms: f64)
    where
        I: IntoIterator<Item = TweenSpec>,
    {
        for (index, spec) in specs.into_iter().enumerate() {
            self.tween_after(index as f64 * step_ms, spec);
        }
    }

    /// Start a sequence's first step; later steps chain off its completion
    pub fn sequence(&mut self, sequence: Sequence) {
        sequence.start(self);
    }

    /// Ask the sequencer to leave `Busy` for `state`
    pub fn settle(&mut self, state: InteractionState) {
        self.settle = Some(state);
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty() && self.delayed.is_empty() && self.settle.is_none()
    }

    pub fn pending_delayed(&self) -> usize {
        self.delayed.len()
    }

    pub fn requested_settle(&self) -> Option<InteractionState> {
        self.settle
    }

    pub(crate) fn take_tweens(&mut self) -> Vec<TweenSpec> {
        std::mem::take(&mut self.tweens)
    }

    pub(crate) fn take_delayed(&mut self) -> Vec<Delayed> {
        std::mem::take(&mut self.delayed)
    }

    pub(crate) fn take_settle(&mut self) -> Option<InteractionState> {
        self.settle.take()
    }

    /// Lengths of the start lists, for [`Commands::adopt`]
    pub(crate) fn mark(&self) -> (usize, usize) {
        (self.tweens.len(), self.delayed.len())
    }

    /// Attach every start queued after `mark` that has no transition yet
    /// to `transition`
    pub(crate) fn adopt(&mut self, mark: (usize, usize), transition: u64) {
        let tweens = self.tweens.iter_mut().skip(mark.0);
        let delayed = self.delayed.iter_mut().skip(mark.1).map(|d| &mut d.spec);
        for spec in tweens.chain(delayed) {
            spec.transition.get_or_insert(transition);
        }
    }
}
