//! Browser-side checks for the JavaScript facade

#![cfg(target_arch = "wasm32")]

use scene_tween::MotionStage;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn rejects_bad_config() {
    assert!(MotionStage::with_config(800.0, 600.0, "ping_pong: { min_ms: 900, max_ms: 100 }").is_err());
    assert!(MotionStage::with_config(800.0, 600.0, "stagger_ms: 50").is_ok());
}

#[wasm_bindgen_test]
fn rejects_unknown_names() {
    let mut stage = MotionStage::new(800.0, 600.0);
    let node = stage.spawn_node("dot", 0.0, 0.0, 0.0);
    assert!(stage.tween(node, "colour", 1.0, 100.0, "linear").is_err());
    assert!(stage.tween(node, "opacity", 0.0, 100.0, "elastic").is_err());
    assert!(stage.register_sphere(node, 1.0, "slot:").is_err());
    assert!(stage.tween(node, "opacity", 0.0, 100.0, "power2.out").is_ok());
    assert!(stage.is_animating(node));
}

#[wasm_bindgen_test]
fn removed_node_stops_animating() {
    let mut stage = MotionStage::new(800.0, 600.0);
    let node = stage.spawn_node("dot", 0.0, 0.0, 0.0);
    stage.start_pulse(node, "scale", 0.8, 1.2).unwrap();
    stage.start();
    assert!(stage.tick(0.0));
    assert!(stage.remove_node(node));
    assert!(stage.tick(16.0));
    assert!(!stage.is_animating(node));
    assert!(stage.node_transform(node).is_none());
}
