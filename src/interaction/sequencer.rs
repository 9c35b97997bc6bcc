//! Interaction state machine
//!
//! `Idle → Busy → {Idle | Settled}`. A trigger is only accepted outside
//! `Busy`; the transition it starts ends when a completion callback asks the
//! sequencer to settle. If every tween of the transition is gone without a
//! settle (node removed, tween superseded or cancelled) the sequencer falls
//! back to `Idle` on [`Sequencer::reconcile`].
//!
//! The sequencer also owns the delay queue used for staggered and postponed
//! tween starts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationDriver, Commands, TweenSpec};
use crate::error::MotionError;
use crate::scene::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionState {
    #[default]
    Idle,
    /// A transition is in flight; new triggers are rejected
    Busy,
    /// A transition finished into a view that can be dismissed
    Settled,
}

impl InteractionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Busy => "busy",
            InteractionState::Settled => "settled",
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of interaction that asks for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Activate,
    Dismiss,
}

struct Pending {
    due_ms: f64,
    order: u64,
    spec: TweenSpec,
}

#[derive(Default)]
pub struct Sequencer {
    state: InteractionState,
    last_trigger: Option<Trigger>,
    /// Number of the most recently accepted transition
    transition: u64,
    pending: Vec<Pending>,
    next_order: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == InteractionState::Busy
    }

    /// The most recently accepted trigger
    pub fn last_trigger(&self) -> Option<Trigger> {
        self.last_trigger
    }

    /// Run `plan` as the transition for `trigger` unless one is in flight.
    ///
    /// Returns false, with nothing changed, while `Busy`. Otherwise the
    /// state becomes `Busy` and the tweens the plan asks for are handed to
    /// the driver at once. A plan that starts nothing and never settles
    /// leaves the sequencer `Idle`.
    pub fn try_trigger<F>(
        &mut self,
        trigger: Trigger,
        now_ms: f64,
        driver: &mut AnimationDriver,
        plan: F,
    ) -> bool
    where
        F: FnOnce(&mut Commands),
    {
        if self.is_busy() {
            log::debug!("{:?} ignored: {}", trigger, MotionError::RejectedWhileBusy);
            return false;
        }

        log::debug!("{:?} accepted from {}", trigger, self.state);
        self.state = InteractionState::Busy;
        self.last_trigger = Some(trigger);

        self.transition += 1;
        let mut commands = Commands::new();
        plan(&mut commands);
        let idle_plan = commands.is_empty();
        commands.adopt((0, 0), self.transition);
        self.absorb(now_ms, driver, commands);

        if idle_plan {
            self.state = InteractionState::Idle;
        }
        true
    }

    /// Route follow-up work: immediate starts to the driver, delayed ones to
    /// the queue, then any settle request
    pub fn absorb(&mut self, now_ms: f64, driver: &mut AnimationDriver, mut commands: Commands) {
        for spec in commands.take_tweens() {
            driver.start(spec);
        }
        for delayed in commands.take_delayed() {
            self.schedule(now_ms + delayed.delay_ms, delayed.spec);
        }
        if let Some(state) = commands.take_settle() {
            self.settle(state);
        }
    }

    /// Leave `Busy` for `state`. Ignored outside `Busy`.
    pub fn settle(&mut self, state: InteractionState) -> bool {
        if !self.is_busy() {
            log::warn!("settle to {} ignored while {}", state, self.state);
            return false;
        }
        if state == InteractionState::Busy {
            log::warn!("settle to busy ignored");
            return false;
        }
        log::debug!("settled: {}", state);
        self.state = state;
        true
    }

    /// Fall back to `Idle` when the running transition has no tween left
    /// in the driver or the delay queue. Returns true if it did.
    pub fn reconcile(&mut self, driver: &AnimationDriver) -> bool {
        if !self.is_busy() {
            return false;
        }
        let current = Some(self.transition);
        if driver.carries(self.transition) || self.pending.iter().any(|p| p.spec.transition == current) {
            return false;
        }
        log::warn!("transition {} lost its tweens before settling, back to idle", self.transition);
        self.state = InteractionState::Idle;
        true
    }

    /// Start `spec` once the clock reaches `at_ms`
    pub fn schedule(&mut self, at_ms: f64, spec: TweenSpec) {
        self.next_order += 1;
        self.pending.push(Pending {
            due_ms: at_ms,
            order: self.next_order,
            spec,
        });
    }

    /// Take every start due at `now_ms`, earliest first
    pub fn release_due(&mut self, now_ms: f64) -> Vec<TweenSpec> {
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now_ms);
        self.pending = rest;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.order.cmp(&b.order)));
        due.into_iter().map(|p| p.spec).collect()
    }

    /// Number of starts still waiting
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drop waiting starts for `node`
    pub fn cancel_node(&mut self, node: NodeId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.spec.node != node);
        before - self.pending.len()
    }

    /// Back to `Idle` with an empty queue
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.pending.clear();
    }
}

impl fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("state", &self.state)
            .field("last_trigger", &self.last_trigger)
            .field("transition", &self.transition)
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ScalarProperty, Scene, SceneGraph, Transform};

    fn fade(node: NodeId) -> TweenSpec {
        TweenSpec::scalar(node, ScalarProperty::Opacity, 1.0, 0.0).duration(100.0)
    }

    #[test]
    fn test_trigger_rejected_while_busy() {
        let mut scene = Scene::new();
        let card = scene.spawn("card", Transform::default());
        let mut seq = Sequencer::new();
        let mut driver = AnimationDriver::new();

        assert!(seq.try_trigger(Trigger::Activate, 0.0, &mut driver, |cmds| cmds.tween(fade(card))));
        assert_eq!(seq.state(), InteractionState::Busy);
        assert_eq!(driver.len(), 1);

        let mut ran = false;
        assert!(!seq.try_trigger(Trigger::Activate, 10.0, &mut driver, |_| ran = true));
        assert!(!ran);
        assert_eq!(seq.state(), InteractionState::Busy);
        assert_eq!(driver.len(), 1);
    }

    #[test]
    fn test_settle_from_completion() {
        let mut scene = Scene::new();
        let card = scene.spawn("card", Transform::default());
        let mut seq = Sequencer::new();
        let mut driver = AnimationDriver::new();

        seq.try_trigger(Trigger::Activate, 0.0, &mut driver, |cmds| {
            cmds.tween(fade(card).on_complete(|cmds| cmds.settle(InteractionState::Settled)));
        });

        let cmds = driver.advance(0.0, &mut scene);
        seq.absorb(0.0, &mut driver, cmds);
        assert!(seq.is_busy());

        let cmds = driver.advance(100.0, &mut scene);
        seq.absorb(100.0, &mut driver, cmds);
        assert_eq!(seq.state(), InteractionState::Settled);
        assert_eq!(scene.read_scalar(card, ScalarProperty::Opacity), Some(0.0));

        // Dismiss from Settled goes back through Busy
        assert!(seq.try_trigger(Trigger::Dismiss, 200.0, &mut driver, |cmds| {
            cmds.tween(fade(card).on_complete(|cmds| cmds.settle(InteractionState::Idle)));
        }));
        assert!(seq.is_busy());
        assert_eq!(seq.last_trigger(), Some(Trigger::Dismiss));
    }

    #[test]
    fn test_empty_plan_returns_to_idle() {
        let mut seq = Sequencer::new();
        let mut driver = AnimationDriver::new();
        assert!(seq.try_trigger(Trigger::Activate, 0.0, &mut driver, |_| {}));
        assert_eq!(seq.state(), InteractionState::Idle);
    }

    #[test]
    fn test_settle_ignored_outside_busy() {
        let mut seq = Sequencer::new();
        assert!(!seq.settle(InteractionState::Settled));
        assert_eq!(seq.state(), InteractionState::Idle);
    }

    #[test]
    fn test_reconcile_after_carrier_cancelled() {
        let mut scene = Scene::new();
        let card = scene.spawn("card", Transform::default());
        let mut seq = Sequencer::new();
        let mut driver = AnimationDriver::new();

        seq.try_trigger(Trigger::Activate, 0.0, &mut driver, |cmds| {
            cmds.tween(fade(card).on_complete(|cmds| cmds.settle(InteractionState::Settled)));
        });
        assert!(!seq.reconcile(&driver));
        assert!(seq.is_busy());

        driver.cancel_node(card);
        assert!(seq.reconcile(&driver));
        assert_eq!(seq.state(), InteractionState::Idle);
        assert!(seq.try_trigger(Trigger::Activate, 10.0, &mut driver, |cmds| cmds.tween(fade(card))));
    }

    #[test]
    fn test_reconcile_waits_for_delayed_starts() {
        let mut scene = Scene::new();
        let card = scene.spawn("card", Transform::default());
        let mut seq = Sequencer::new();
        let mut driver = AnimationDriver::new();

        seq.try_trigger(Trigger::Activate, 0.0, &mut driver, |cmds| {
            cmds.tween_after(300.0, fade(card).on_complete(|cmds| cmds.settle(InteractionState::Settled)));
        });
        assert!(driver.is_empty());
        assert!(!seq.reconcile(&driver));

        // tweens outside the transition do not keep it alive
        driver.start(TweenSpec::scalar(card, ScalarProperty::UniformScale, 1.0, 2.0));
        seq.cancel_node(card);
        assert!(seq.reconcile(&driver));
    }

    #[test]
    fn test_release_due_in_order() {
        let mut scene = Scene::new();
        let a = scene.spawn("a", Transform::default());
        let b = scene.spawn("b", Transform::default());
        let mut seq = Sequencer::new();

        seq.schedule(200.0, fade(b));
        seq.schedule(100.0, fade(a));
        seq.schedule(300.0, fade(a));

        assert!(seq.release_due(50.0).is_empty());
        let due: Vec<NodeId> = seq.release_due(200.0).iter().map(|s| s.node).collect();
        assert_eq!(due, vec![a, b]);
        assert_eq!(seq.pending(), 1);

        assert_eq!(seq.cancel_node(a), 1);
        assert!(seq.release_due(1000.0).is_empty());
    }

    #[test]
    fn test_stagger_through_queue() {
        let mut scene = Scene::new();
        let nodes: Vec<NodeId> = (0..3).map(|i| scene.spawn(&format!("n{}", i), Transform::default())).collect();
        let mut seq = Sequencer::new();
        let mut driver = AnimationDriver::new();

        seq.try_trigger(Trigger::Activate, 1000.0, &mut driver, |cmds| {
            cmds.stagger(nodes.iter().map(|&n| fade(n)), 100.0);
        });
        assert!(driver.is_empty());
        assert_eq!(seq.pending(), 3);

        assert_eq!(seq.release_due(1000.0).len(), 1);
        assert_eq!(seq.release_due(1150.0).len(), 1);
        assert_eq!(seq.release_due(1200.0).len(), 1);
    }
}
