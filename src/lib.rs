use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{Key, KeyData};
use wasm_bindgen::prelude::*;

pub mod animation;
pub mod clock;
pub mod config;
pub mod error;
pub mod interaction;
pub mod math;
pub mod scene;
pub mod stage;

pub use error::MotionError;
pub use stage::Stage;

use animation::{Easing, TweenSpec};
use clock::AnimationFrameLoop;
use config::MotionConfig;
use interaction::{Hit, InteractionState, NodeTag, PickEntry, PickShape, Trigger};
use math::{GeodesicRoute, Vec3};
use scene::{NodeId, ScalarProperty, Scene, SceneGraph, Transform, Viewport};

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Already set when the module is initialized twice
    let _ = console_log::init_with_level(log::Level::Info);
}

/// One scene's motion state exposed to JavaScript
#[wasm_bindgen]
pub struct MotionStage {
    stage: Rc<RefCell<Stage<Scene>>>,
    frame_loop: Option<AnimationFrameLoop>,
    /// Node brought forward by the last accepted activation
    focused: Option<NodeId>,
}

#[wasm_bindgen]
impl MotionStage {
    /// Create a stage with default configuration
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> MotionStage {
        Self::from_config(width, height, MotionConfig::default())
    }

    /// Create a stage from a YAML configuration document
    #[wasm_bindgen]
    pub fn with_config(width: f32, height: f32, yaml: &str) -> Result<MotionStage, JsValue> {
        let config = MotionConfig::from_yaml(yaml).map_err(to_js)?;
        Ok(Self::from_config(width, height, config))
    }

    fn from_config(width: f32, height: f32, config: MotionConfig) -> MotionStage {
        let stage = Stage::new(Scene::new(), Viewport::new(width, height), config);
        Self {
            stage: Rc::new(RefCell::new(stage)),
            frame_loop: None,
            focused: None,
        }
    }

    // === Scene ===

    #[wasm_bindgen]
    pub fn spawn_node(&mut self, name: &str, x: f32, y: f32, z: f32) -> u64 {
        let node = self
            .stage
            .borrow_mut()
            .scene_mut()
            .spawn(name, Transform::at(Vec3::new(x, y, z)));
        node_to_js(node)
    }

    #[wasm_bindgen]
    pub fn spawn_child(&mut self, parent: u64, name: &str, x: f32, y: f32, z: f32) -> Result<u64, JsValue> {
        self.stage
            .borrow_mut()
            .scene_mut()
            .spawn_child(node_from_js(parent), name, Transform::at(Vec3::new(x, y, z)))
            .map(node_to_js)
            .ok_or_else(|| to_js(MotionError::StaleNodeReference))
    }

    /// Remove a node and its subtree; their tweens stop
    #[wasm_bindgen]
    pub fn remove_node(&mut self, id: u64) -> bool {
        let node = node_from_js(id);
        if self.focused == Some(node) {
            self.focused = None;
        }
        self.stage.borrow_mut().remove_node(node)
    }

    /// Re-parent `child` under `parent`. With `keep_world` it stays put on
    /// screen, otherwise it keeps its local transform.
    #[wasm_bindgen]
    pub fn attach(&mut self, child: u64, parent: u64, keep_world: bool) -> bool {
        let (child, parent) = (node_from_js(child), node_from_js(parent));
        let mut stage = self.stage.borrow_mut();
        if keep_world {
            stage.scene_mut().attach_keeping_world(child, parent)
        } else {
            stage.scene_mut().attach(child, parent)
        }
    }

    /// Move a node to the root level
    #[wasm_bindgen]
    pub fn detach(&mut self, id: u64, keep_world: bool) -> bool {
        let node = node_from_js(id);
        let mut stage = self.stage.borrow_mut();
        if keep_world {
            stage.scene_mut().detach_keeping_world(node)
        } else {
            stage.scene_mut().detach(node)
        }
    }

    #[wasm_bindgen]
    pub fn set_position(&mut self, id: u64, x: f32, y: f32, z: f32) -> bool {
        self.stage
            .borrow_mut()
            .scene_mut()
            .set_position(node_from_js(id), Vec3::new(x, y, z))
    }

    #[wasm_bindgen]
    pub fn set_rotation(&mut self, id: u64, x: f32, y: f32, z: f32) -> bool {
        self.stage
            .borrow_mut()
            .scene_mut()
            .set_rotation(node_from_js(id), Vec3::new(x, y, z))
    }

    /// Position, rotation, scale and opacity as 10 floats
    #[wasm_bindgen]
    pub fn node_transform(&self, id: u64) -> Option<Vec<f32>> {
        let stage = self.stage.borrow();
        let node = stage.scene().get(node_from_js(id))?;
        let t = node.transform;
        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&t.position.to_array());
        out.extend_from_slice(&t.rotation.to_array());
        out.extend_from_slice(&t.scale.to_array());
        out.push(node.opacity);
        Some(out)
    }

    /// World-space position as 3 floats
    #[wasm_bindgen]
    pub fn world_position(&self, id: u64) -> Option<Vec<f32>> {
        self.stage
            .borrow()
            .scene()
            .world_position(node_from_js(id))
            .map(|p| p.to_array().to_vec())
    }

    // === Picking ===

    #[wasm_bindgen]
    pub fn register_sphere(&mut self, id: u64, radius: f32, tag: &str) -> Result<bool, JsValue> {
        self.register(id, PickShape::Sphere { radius }, tag)
    }

    #[wasm_bindgen]
    pub fn register_box(&mut self, id: u64, hx: f32, hy: f32, hz: f32, tag: &str) -> Result<bool, JsValue> {
        self.register(id, PickShape::Box { half_extents: Vec3::new(hx, hy, hz) }, tag)
    }

    #[wasm_bindgen]
    pub fn register_quad(&mut self, id: u64, half_width: f32, half_height: f32, tag: &str) -> Result<bool, JsValue> {
        self.register(id, PickShape::Quad { half_width, half_height }, tag)
    }

    fn register(&mut self, id: u64, shape: PickShape, tag: &str) -> Result<bool, JsValue> {
        let tag = parse_tag(tag).ok_or_else(|| JsValue::from_str(&format!("unknown tag: {}", tag)))?;
        let node = node_from_js(id);
        let mut stage = self.stage.borrow_mut();
        if !stage.scene().contains(node) {
            return Err(to_js(MotionError::StaleNodeReference));
        }
        Ok(stage.register(PickEntry::new(node, shape).tagged(tag)))
    }

    #[wasm_bindgen]
    pub fn unregister(&mut self, id: u64) -> bool {
        self.stage.borrow_mut().unregister(node_from_js(id))
    }

    /// Node under the pointer, in any interaction state
    #[wasm_bindgen]
    pub fn hover(&self, x: f32, y: f32) -> Option<u64> {
        self.stage.borrow().hover(x, y).map(node_to_js)
    }

    /// Tag of the node under the pointer (`plain`, `terminal`, `dismiss`, `slot:N`)
    #[wasm_bindgen]
    pub fn hover_tag(&self, x: f32, y: f32) -> Option<String> {
        self.stage.borrow().pick(x, y, None).map(|hit| tag_name(hit.tag))
    }

    // === Tweens ===

    /// Tween a named property from its current value
    #[wasm_bindgen]
    pub fn tween(&mut self, id: u64, property: &str, to: f32, duration_ms: f64, easing: &str) -> Result<(), JsValue> {
        let property: ScalarProperty = property.parse().map_err(to_js)?;
        let easing: Easing = easing.parse().map_err(to_js)?;
        let spec = TweenSpec::scalar_to(node_from_js(id), property, to)
            .duration(duration_ms)
            .easing(easing);
        self.stage.borrow_mut().tween(spec);
        Ok(())
    }

    /// Endless back-and-forth between `from` and `to`
    #[wasm_bindgen]
    pub fn start_pulse(&mut self, id: u64, property: &str, from: f32, to: f32) -> Result<(), JsValue> {
        let property: ScalarProperty = property.parse().map_err(to_js)?;
        self.stage
            .borrow_mut()
            .ping_pong(node_from_js(id), property, from, to);
        Ok(())
    }

    /// Grow the given nodes one after another
    #[wasm_bindgen]
    pub fn stagger_scale(&mut self, ids: Vec<u64>, from: f32, to: f32, duration_ms: f64) {
        let mut stage = self.stage.borrow_mut();
        let easing = stage.config().default_easing;
        let specs: Vec<TweenSpec> = ids
            .into_iter()
            .map(|id| {
                TweenSpec::scalar(node_from_js(id), ScalarProperty::UniformScale, from, to)
                    .duration(duration_ms)
                    .easing(easing)
            })
            .collect();
        stage.stagger(specs);
    }

    /// Fly a node around the globe through `coords`, given as flat
    /// `[lat0, lon0, lat1, lon1, ...]` degrees, `leg_ms` per leg
    #[wasm_bindgen]
    pub fn fly_route(&mut self, id: u64, coords: Vec<f32>, altitude: f32, leg_ms: f64) -> Result<bool, JsValue> {
        if coords.len() % 2 != 0 {
            return Err(JsValue::from_str("route coordinates must come in latitude/longitude pairs"));
        }
        let points: Vec<(f32, f32)> = coords.chunks_exact(2).map(|c| (c[0], c[1])).collect();
        let route = GeodesicRoute::from_lat_lon(&points, altitude, leg_ms);
        Ok(self.stage.borrow_mut().fly_route(node_from_js(id), Rc::new(route)))
    }

    #[wasm_bindgen]
    pub fn is_animating(&self, id: u64) -> bool {
        self.stage.borrow().driver().is_animating(node_from_js(id))
    }

    // === Interaction ===

    /// Bring the node under the pointer forward by scaling it to `scale`.
    ///
    /// Returns the node when the activation was accepted; `undefined` when
    /// nothing was hit or a transition is still running.
    #[wasm_bindgen]
    pub fn activate(&mut self, x: f32, y: f32, scale: f32, duration_ms: f64) -> Option<u64> {
        let mut stage = self.stage.borrow_mut();
        let easing = stage.config().default_easing;
        let skip_dismiss = |hit: &Hit| hit.tag != NodeTag::Dismiss;

        let hit = stage.activate_at(x, y, Some(&skip_dismiss), |hit, cmds| {
            let spec = TweenSpec::scalar_to(hit.node, ScalarProperty::UniformScale, scale)
                .duration(duration_ms)
                .easing(easing)
                .on_complete(|cmds| cmds.settle(InteractionState::Settled));
            cmds.tween(spec);
        })?;

        self.focused = Some(hit.node);
        Some(node_to_js(hit.node))
    }

    /// Return the focused node to unit scale. False while a transition runs.
    #[wasm_bindgen]
    pub fn dismiss(&mut self, duration_ms: f64) -> bool {
        let focused = self.focused;
        let mut stage = self.stage.borrow_mut();
        let easing = stage.config().default_easing;

        let accepted = stage.try_trigger(Trigger::Dismiss, |cmds| {
            if let Some(node) = focused {
                let spec = TweenSpec::scalar_to(node, ScalarProperty::UniformScale, 1.0)
                    .duration(duration_ms)
                    .easing(easing)
                    .on_complete(|cmds| cmds.settle(InteractionState::Idle));
                cmds.tween(spec);
            }
        });
        if accepted {
            self.focused = None;
        }
        accepted
    }

    /// `idle`, `busy` or `settled`
    #[wasm_bindgen]
    pub fn interaction_state(&self) -> String {
        self.stage.borrow().state().to_string()
    }

    // === Frame loop ===

    /// Advance one frame by hand (when not using `start_loop`)
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.stage.borrow_mut().tick(now_ms)
    }

    #[wasm_bindgen]
    pub fn start(&mut self) {
        self.stage.borrow_mut().start();
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.stage.borrow_mut().stop();
    }

    /// Tick on every animation frame, then call `on_frame(now_ms)` to render
    #[wasm_bindgen]
    pub fn start_loop(&mut self, on_frame: js_sys::Function) -> Result<(), JsValue> {
        self.stop_loop();
        self.stage.borrow_mut().start();

        let stage = Rc::clone(&self.stage);
        let frame_loop = AnimationFrameLoop::start(move |now| {
            let running = match stage.try_borrow_mut() {
                Ok(mut stage) => {
                    stage.tick(now);
                    stage.is_running()
                }
                Err(_) => true,
            };
            if running {
                if let Err(e) = on_frame.call1(&JsValue::NULL, &JsValue::from_f64(now)) {
                    log::warn!("frame callback failed: {:?}", e);
                }
            }
            running
        })?;

        self.frame_loop = Some(frame_loop);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn stop_loop(&mut self) {
        self.stage.borrow_mut().stop();
        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.stop();
        }
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: f32, height: f32) {
        self.stage.borrow_mut().resize(width, height);
    }
}

fn to_js(err: MotionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn node_to_js(node: NodeId) -> u64 {
    node.data().as_ffi()
}

fn node_from_js(id: u64) -> NodeId {
    NodeId::from(KeyData::from_ffi(id))
}

fn parse_tag(name: &str) -> Option<NodeTag> {
    match name.trim().to_ascii_lowercase().as_str() {
        "" | "plain" => Some(NodeTag::Plain),
        "terminal" => Some(NodeTag::Terminal),
        "dismiss" => Some(NodeTag::Dismiss),
        other => other
            .strip_prefix("slot:")
            .and_then(|index| index.parse().ok())
            .map(NodeTag::Slot),
    }
}

fn tag_name(tag: NodeTag) -> String {
    match tag {
        NodeTag::Plain => "plain".to_string(),
        NodeTag::Terminal => "terminal".to_string(),
        NodeTag::Dismiss => "dismiss".to_string(),
        NodeTag::Slot(i) => format!("slot:{}", i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag("Terminal"), Some(NodeTag::Terminal));
        assert_eq!(parse_tag("slot:3"), Some(NodeTag::Slot(3)));
        assert_eq!(parse_tag(""), Some(NodeTag::Plain));
        assert_eq!(parse_tag("slot:x"), None);
        assert_eq!(tag_name(NodeTag::Slot(3)), "slot:3");
    }

    #[test]
    fn test_node_id_round_trip() {
        let mut scene = Scene::new();
        let a = scene.spawn("a", Transform::default());
        scene.remove(a);
        let b = scene.spawn("b", Transform::default());

        assert_eq!(node_from_js(node_to_js(b)), b);
        assert_ne!(node_to_js(a), node_to_js(b));
        assert!(!scene.contains(node_from_js(node_to_js(a))));
    }

    #[test]
    fn test_removing_focused_node_unblocks_activate() {
        let mut motion = MotionStage::new(800.0, 600.0);
        let card = motion.spawn_node("card", 0.0, 0.0, 0.0);
        motion.register_sphere(card, 0.5, "").unwrap();
        motion.start();
        motion.tick(0.0);

        assert_eq!(motion.activate(400.0, 300.0, 1.3, 200.0), Some(card));
        assert!(motion.remove_node(card));
        motion.tick(16.0);
        assert_eq!(motion.interaction_state(), "idle");

        let next = motion.spawn_node("next", 0.0, 0.0, 0.0);
        motion.register_sphere(next, 0.5, "").unwrap();
        assert_eq!(motion.activate(400.0, 300.0, 1.3, f64::NAN), Some(next));
        motion.tick(32.0);
        assert_eq!(motion.interaction_state(), "settled");
    }

    #[test]
    fn test_fly_route_pairs() {
        let mut motion = MotionStage::new(800.0, 600.0);
        let plane = motion.spawn_node("plane", 0.0, 0.0, 0.0);
        assert_eq!(motion.fly_route(plane, vec![35.7, 139.7, 40.7, -74.0], 1.2, 4000.0).ok(), Some(true));
        assert!(motion.is_animating(plane));
    }

    #[test]
    fn test_activate_and_dismiss() {
        let mut motion = MotionStage::new(800.0, 600.0);
        let card = motion.spawn_node("card", 0.0, 0.0, 0.0);
        assert!(motion.register_sphere(card, 0.5, "slot:0").unwrap());
        motion.start();
        motion.tick(0.0);

        assert_eq!(motion.activate(400.0, 300.0, 1.3, 100.0), Some(card));
        assert_eq!(motion.interaction_state(), "busy");
        assert_eq!(motion.activate(400.0, 300.0, 1.3, 100.0), None);

        motion.tick(16.0);
        motion.tick(116.0);
        assert_eq!(motion.interaction_state(), "settled");
        assert_eq!(motion.node_transform(card).unwrap()[6], 1.3);

        assert!(motion.dismiss(100.0));
        motion.tick(132.0);
        motion.tick(232.0);
        assert_eq!(motion.interaction_state(), "idle");
        assert_eq!(motion.node_transform(card).unwrap()[6], 1.0);
    }
}
