//! Self-restarting tweens
//!
//! A loop is a tween whose completion callback starts the next cycle, so it
//! lives exactly as long as the driver keeps it: superseding the property or
//! removing the node ends it.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::RngExt;
use serde::{Deserialize, Serialize};

use super::easing::Easing;
use super::tween::{Commands, TweenSpec};
use crate::math::{GeodesicRoute, Vec3};
use crate::scene::{NodeId, ScalarProperty, VectorProperty};

/// Inclusive range a cycle's duration is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationRange {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl Default for DurationRange {
    fn default() -> Self {
        Self {
            min_ms: 2000.0,
            max_ms: 2800.0,
        }
    }
}

impl DurationRange {
    pub fn new(min_ms: f64, max_ms: f64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn fixed(ms: f64) -> Self {
        Self::new(ms, ms)
    }

    pub fn roll(&self, rng: &mut StdRng) -> f64 {
        if self.max_ms <= self.min_ms {
            return self.min_ms;
        }
        rng.random_range(self.min_ms..=self.max_ms)
    }

    pub fn contains(&self, ms: f64) -> bool {
        ms >= self.min_ms && ms <= self.max_ms
    }
}

/// Tween `property` back and forth between `from` and `to` forever.
///
/// Every cycle swaps the endpoints and draws a fresh duration from `range`.
pub fn ping_pong(
    node: NodeId,
    property: ScalarProperty,
    from: f32,
    to: f32,
    easing: Easing,
    range: DurationRange,
    mut rng: StdRng,
) -> TweenSpec {
    let duration = range.roll(&mut rng);
    TweenSpec::scalar(node, property, from, to)
        .duration(duration)
        .easing(easing)
        .on_complete(move |cmds| {
            cmds.tween(ping_pong(node, property, to, from, easing, range, rng));
        })
}

/// Fly `node` along the route's legs on great circles, wrapping from the
/// last waypoint back to the first, and turn it to face each waypoint on
/// the way.
///
/// Queues the leg starting at waypoint `leg` on `cmds`. False, with nothing
/// queued, for routes shorter than two points.
pub fn route_loop(cmds: &mut Commands, node: NodeId, route: Rc<GeodesicRoute>, leg: usize, easing: Easing) -> bool {
    if route.len() < 2 {
        return false;
    }
    let leg = leg % route.len();
    let next = (leg + 1) % route.len();
    let (Some(from), Some(to), Some(face_from), Some(face_to)) =
        (route.waypoint(leg), route.waypoint(next), route.heading(leg), route.heading(next))
    else {
        return false;
    };
    let duration = route.leg_ms();

    let turn_from = face_from.to_euler_xyz();
    let turn_to = nearest_angles(turn_from, face_to.to_euler_xyz());
    cmds.tween(
        TweenSpec::vector(node, VectorProperty::Rotation, turn_from, turn_to)
            .duration(duration)
            .easing(easing),
    );
    cmds.tween(
        TweenSpec::vector(node, VectorProperty::Position, from, to)
            .geodesic()
            .duration(duration)
            .easing(easing)
            .on_complete(move |cmds| {
                route_loop(cmds, node, route, next, easing);
            }),
    );
    true
}

/// `to` shifted by whole turns so each angle lies within half a turn of `from`
fn nearest_angles(from: Vec3, to: Vec3) -> Vec3 {
    use std::f32::consts::{PI, TAU};
    let near = |a: f32, b: f32| a + (b - a + PI).rem_euclid(TAU) - PI;
    Vec3::new(near(from.x, to.x), near(from.y, to.y), near(from.z, to.z))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::animation::AnimationDriver;
    use crate::math::{Axis, Mat4};
    use crate::scene::{Scene, SceneGraph, Transform};

    #[test]
    fn test_roll_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = DurationRange::default();
        for _ in 0..50 {
            assert!(range.contains(range.roll(&mut rng)));
        }
        assert_eq!(DurationRange::fixed(300.0).roll(&mut rng), 300.0);
    }

    #[test]
    fn test_ping_pong_lands_on_alternate_endpoints() {
        let mut scene = Scene::new();
        let card = scene.spawn("card", Transform::default());
        let prop = ScalarProperty::Position(Axis::Y);
        let range = DurationRange::new(100.0, 140.0);
        let mut driver = AnimationDriver::new();

        driver.start(ping_pong(card, prop, 0.0, 0.2, Easing::QuadInOut, range, StdRng::seed_from_u64(7)));
        let mut current = driver.iter().next().map(|t| t.id());

        let mut landings = Vec::new();
        let mut now = 0.0;
        while now < 2000.0 {
            driver.advance(now, &mut scene);
            let tween = driver.tween_for(card, prop.footprint()).expect("loop keeps running");
            assert!(range.contains(tween.duration_ms()));
            if Some(tween.id()) != current {
                // a cycle completed this tick; its successor has not advanced yet
                landings.push(scene.read_scalar(card, prop).unwrap());
                current = Some(tween.id());
            } else {
                let y = scene.read_scalar(card, prop).unwrap();
                assert!((0.0..=0.2).contains(&y));
            }
            now += 16.0;
        }

        assert!(landings.len() >= 10);
        for (i, y) in landings.iter().enumerate() {
            let expected = if i % 2 == 0 { 0.2 } else { 0.0 };
            assert_eq!(*y, expected, "completion {}", i);
        }
    }

    #[test]
    fn test_ping_pong_stops_when_superseded() {
        let mut scene = Scene::new();
        let card = scene.spawn("card", Transform::default());
        let prop = ScalarProperty::Position(Axis::Y);
        let mut driver = AnimationDriver::new();

        driver.start(ping_pong(card, prop, 0.0, 1.0, Easing::Linear, DurationRange::fixed(50.0), StdRng::seed_from_u64(1)));
        driver.advance(0.0, &mut scene);
        driver.start(TweenSpec::scalar(card, prop, 5.0, 5.0).duration(10.0));
        driver.advance(10.0, &mut scene);
        driver.advance(20.0, &mut scene);

        assert!(driver.is_empty());
        assert_eq!(scene.read_scalar(card, prop), Some(5.0));
    }

    fn start_all(driver: &mut AnimationDriver, mut cmds: Commands) {
        for spec in cmds.take_tweens() {
            driver.start(spec);
        }
    }

    fn facing(scene: &Scene, node: NodeId) -> Vec3 {
        let rotation = scene.read_vector(node, VectorProperty::Rotation).unwrap();
        Mat4::from_trs(Vec3::ZERO, rotation, Vec3::ONE).transform_direction(Vec3::FORWARD)
    }

    #[test]
    fn test_route_loop_wraps() {
        let mut scene = Scene::new();
        let plane = scene.spawn("plane", Transform::default());
        let route = Rc::new(GeodesicRoute::new(
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
            1.0,
            100.0,
        ));
        let mut driver = AnimationDriver::new();
        let mut cmds = Commands::new();
        assert!(route_loop(&mut cmds, plane, Rc::clone(&route), 2, Easing::Linear));
        start_all(&mut driver, cmds);
        assert_eq!(driver.len(), 2);

        driver.advance(0.0, &mut scene);
        assert!(facing(&scene, plane).distance(&Vec3::FORWARD) < 0.0001);
        driver.advance(100.0, &mut scene);
        let p = scene.read_vector(plane, VectorProperty::Position).unwrap();
        assert!(p.distance(&Vec3::new(1.0, 0.0, 0.0)) < 0.0001);
        assert!(facing(&scene, plane).distance(&Vec3::RIGHT) < 0.0001);
        assert_eq!(driver.len(), 2);

        driver.advance(116.0, &mut scene);
        driver.advance(166.0, &mut scene);
        let mid = scene.read_vector(plane, VectorProperty::Position).unwrap();
        assert!((mid.length() - 1.0).abs() < 0.0001);
        assert!((mid.x - mid.y).abs() < 0.0001);
    }

    #[test]
    fn test_nearest_angles_takes_short_way() {
        use std::f32::consts::PI;
        let to = nearest_angles(Vec3::new(0.9 * PI, 0.0, -0.9 * PI), Vec3::new(-0.9 * PI, 0.1, 0.9 * PI));
        assert!((to.x - 1.1 * PI).abs() < 0.0001);
        assert!((to.y - 0.1).abs() < 0.0001);
        assert!((to.z + 1.1 * PI).abs() < 0.0001);
    }

    #[test]
    fn test_route_loop_needs_two_points() {
        let mut scene = Scene::new();
        let plane = scene.spawn("plane", Transform::default());
        let route = Rc::new(GeodesicRoute::new(vec![Vec3::UP], 1.0, 100.0));
        let mut cmds = Commands::new();
        assert!(!route_loop(&mut cmds, plane, route, 0, Easing::Linear));
        assert!(cmds.is_empty());
    }
}
