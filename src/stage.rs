//! One scene's worth of motion state
//!
//! A `Stage` owns the scene, camera, tween driver, pickable registry and
//! interaction sequencer for a single scene. There are no globals; two
//! scenes on a page are two stages.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::animation::{ping_pong, route_loop, AnimationDriver, Commands, Easing, TweenId, TweenSpec};
use crate::clock::FrameClock;
use crate::config::MotionConfig;
use crate::interaction::{
    Hit, HitFilter, HitTester, InteractionState, PickEntry, PickableRegistry, Sequencer, Trigger,
};
use crate::math::GeodesicRoute;
use crate::scene::{Camera, NodeId, ScalarProperty, Scene, SceneGraph, Viewport};

#[derive(Debug)]
pub struct Stage<S: SceneGraph> {
    scene: S,
    camera: Camera,
    viewport: Viewport,
    driver: AnimationDriver,
    registry: PickableRegistry,
    sequencer: Sequencer,
    hit_tester: HitTester,
    clock: FrameClock,
    config: MotionConfig,
    rng: StdRng,
}

impl<S: SceneGraph> Stage<S> {
    pub fn new(scene: S, viewport: Viewport, config: MotionConfig) -> Self {
        let camera = config.camera.build(viewport.aspect());
        Self {
            scene,
            camera,
            viewport,
            driver: AnimationDriver::new(),
            registry: PickableRegistry::new(),
            sequencer: Sequencer::new(),
            hit_tester: HitTester::new().with_max_distance(camera.far),
            clock: FrameClock::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    pub fn registry(&self) -> &PickableRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PickableRegistry {
        &mut self.registry
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn state(&self) -> InteractionState {
        self.sequencer.state()
    }

    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Time of the last accepted tick
    pub fn now_ms(&self) -> f64 {
        self.clock.last_ms().unwrap_or(0.0)
    }

    /// Run one frame: release due delayed starts, advance every tween, then
    /// route what their completions asked for. A transition whose tweens
    /// were all dropped before settling returns to `Idle` here.
    /// False while stopped.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(now) = self.clock.tick(now_ms) else {
            return false;
        };

        for spec in self.sequencer.release_due(now) {
            self.driver.start(spec);
        }
        let commands = self.driver.advance(now, &mut self.scene);
        self.sequencer.absorb(now, &mut self.driver, commands);
        self.sequencer.reconcile(&self.driver);
        true
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
        self.camera.set_aspect(self.viewport.aspect());
    }

    /// Start a tween right away; its first advance is the next tick
    pub fn tween(&mut self, spec: TweenSpec) -> TweenId {
        self.driver.start(spec)
    }

    /// Tween from the node's current value using the configured easing
    pub fn tween_to(&mut self, node: NodeId, property: ScalarProperty, to: f32, duration_ms: f64) -> TweenId {
        let spec = TweenSpec::scalar_to(node, property, to)
            .duration(duration_ms)
            .easing(self.config.default_easing);
        self.driver.start(spec)
    }

    /// Endless back-and-forth on `property` with durations from the
    /// configured range
    pub fn ping_pong(&mut self, node: NodeId, property: ScalarProperty, from: f32, to: f32) -> TweenId {
        let rng = StdRng::seed_from_u64(self.rng.random());
        let spec = ping_pong(node, property, from, to, self.config.default_easing, self.config.ping_pong, rng);
        self.driver.start(spec)
    }

    /// Fly `node` around `route` at constant speed until superseded.
    /// False for routes shorter than two points.
    pub fn fly_route(&mut self, node: NodeId, route: Rc<GeodesicRoute>) -> bool {
        let mut commands = Commands::new();
        if !route_loop(&mut commands, node, route, 0, Easing::Linear) {
            return false;
        }
        let now = self.now_ms();
        self.sequencer.absorb(now, &mut self.driver, commands);
        true
    }

    /// Start `specs` one after another, `stagger_ms` apart
    pub fn stagger<I>(&mut self, specs: I)
    where
        I: IntoIterator<Item = TweenSpec>,
    {
        let mut commands = Commands::new();
        commands.stagger(specs, self.config.stagger_ms);
        let now = self.now_ms();
        self.sequencer.absorb(now, &mut self.driver, commands);
    }

    pub fn cancel(&mut self, id: TweenId) -> bool {
        self.driver.cancel(id)
    }

    pub fn register(&mut self, entry: PickEntry) -> bool {
        self.registry.insert(entry)
    }

    /// Stop picking `node` and drop everything animating it
    pub fn unregister(&mut self, node: NodeId) -> bool {
        self.driver.cancel_node(node);
        self.sequencer.cancel_node(node);
        self.registry.remove(node)
    }

    /// Nearest registered node under the pointer that `filter` accepts.
    /// Works in every interaction state.
    pub fn pick(&self, x: f32, y: f32, filter: Option<HitFilter<'_>>) -> Option<Hit> {
        self.hit_tester
            .pick(x, y, self.viewport, &self.camera, &self.registry, &self.scene, filter)
    }

    pub fn pick_all(&self, x: f32, y: f32) -> Vec<Hit> {
        self.hit_tester
            .pick_all(x, y, self.viewport, &self.camera, &self.registry, &self.scene)
    }

    pub fn hover(&self, x: f32, y: f32) -> Option<NodeId> {
        self.pick(x, y, None).map(|hit| hit.node)
    }

    /// Ask the sequencer to run `plan`; false while a transition is in flight
    pub fn try_trigger<F>(&mut self, trigger: Trigger, plan: F) -> bool
    where
        F: FnOnce(&mut Commands),
    {
        let now = self.now_ms();
        self.sequencer.reconcile(&self.driver);
        self.sequencer.try_trigger(trigger, now, &mut self.driver, plan)
    }

    /// Pick under the pointer and, on an accepted hit, trigger `plan` for it.
    ///
    /// Returns the hit only when the trigger was accepted.
    pub fn activate_at<F>(&mut self, x: f32, y: f32, filter: Option<HitFilter<'_>>, plan: F) -> Option<Hit>
    where
        F: FnOnce(&Hit, &mut Commands),
    {
        let hit = self.pick(x, y, filter)?;
        self.try_trigger(Trigger::Activate, |cmds| plan(&hit, cmds))
            .then_some(hit)
    }
}

impl Stage<Scene> {
    /// Remove `node` and its subtree from the scene along with their
    /// registry entries. Running tweens on them go inert.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        if !self.scene.remove(node) {
            return false;
        }
        self.driver.cancel_node(node);
        self.sequencer.cancel_node(node);
        self.registry.retain_live(&self.scene);
        true
    }
}
