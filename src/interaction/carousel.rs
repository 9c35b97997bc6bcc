//! Cards arranged on a ring that turns around the Y axis
//!
//! The front card is found from world positions every time it is asked for,
//! so it is always right no matter how the ring got to where it is.

use std::f32::consts::TAU;

use crate::math::Vec3;
use crate::scene::{NodeId, SceneGraph, VectorProperty};

#[derive(Debug, Clone)]
pub struct CarouselRing {
    cards: Vec<NodeId>,
    /// Angular tolerance (radians) for the front slot
    epsilon: f32,
}

impl CarouselRing {
    pub fn new(cards: Vec<NodeId>, epsilon: f32) -> Self {
        Self { cards, epsilon }
    }

    pub fn cards(&self) -> &[NodeId] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Angle between neighbouring cards
    pub fn step_angle(&self) -> f32 {
        if self.cards.is_empty() {
            0.0
        } else {
            TAU / self.cards.len() as f32
        }
    }

    /// Spread the cards evenly on a circle of `radius`, card 0 facing +Z
    pub fn layout<S: SceneGraph + ?Sized>(&self, scene: &mut S, radius: f32) {
        let step = self.step_angle();
        for (i, &card) in self.cards.iter().enumerate() {
            let angle = step * i as f32;
            scene.write_vector(
                card,
                VectorProperty::Position,
                Vec3::new(radius * angle.sin(), 0.0, radius * angle.cos()),
            );
            scene.write_vector(card, VectorProperty::Rotation, Vec3::new(0.0, angle, 0.0));
        }
    }

    /// Index of the card whose world position sits straight in front of the
    /// ring's axis (`atan2(x, z)` within epsilon of zero)
    pub fn front_index<S: SceneGraph + ?Sized>(&self, scene: &S) -> Option<usize> {
        self.cards.iter().position(|&card| {
            scene
                .world_position(card)
                .map(|p| p.x.atan2(p.z).abs() < self.epsilon)
                .unwrap_or(false)
        })
    }

    pub fn front<S: SceneGraph + ?Sized>(&self, scene: &S) -> Option<NodeId> {
        self.front_index(scene).map(|i| self.cards[i])
    }

    /// The cards a pointer may act on: `[next, front, previous]`
    pub fn clickable_window<S: SceneGraph + ?Sized>(&self, scene: &S) -> Option<[NodeId; 3]> {
        let front = self.front_index(scene)?;
        let n = self.cards.len();
        Some([
            self.cards[(front + 1) % n],
            self.cards[front],
            self.cards[(front + n - 1) % n],
        ])
    }

    /// Ring rotation (Y, radians) that brings card `index` to the front
    pub fn rotation_for(&self, index: usize) -> f32 {
        -self.step_angle() * index as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Scene, Transform};

    fn ring(scene: &mut Scene, count: usize) -> (NodeId, CarouselRing) {
        let group = scene.spawn("ring", Transform::default());
        let cards = (0..count)
            .filter_map(|i| scene.spawn_child(group, &format!("card{}", i), Transform::default()))
            .collect();
        let ring = CarouselRing::new(cards, 0.01);
        ring.layout(scene, 3.0);
        (group, ring)
    }

    #[test]
    fn test_front_follows_rotation() {
        let mut scene = Scene::new();
        let (group, ring) = ring(&mut scene, 6);
        assert_eq!(ring.front_index(&scene), Some(0));

        scene.set_rotation(group, Vec3::new(0.0, ring.rotation_for(2), 0.0));
        assert_eq!(ring.front_index(&scene), Some(2));
    }

    #[test]
    fn test_no_front_between_slots() {
        let mut scene = Scene::new();
        let (group, ring) = ring(&mut scene, 6);
        scene.set_rotation(group, Vec3::new(0.0, ring.step_angle() * 0.5, 0.0));
        assert_eq!(ring.front_index(&scene), None);
        assert!(ring.clickable_window(&scene).is_none());
    }

    #[test]
    fn test_clickable_window_wraps() {
        let mut scene = Scene::new();
        let (_, ring) = ring(&mut scene, 4);
        let cards = ring.cards().to_vec();
        assert_eq!(ring.clickable_window(&scene), Some([cards[1], cards[0], cards[3]]));
    }
}
