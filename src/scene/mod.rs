//! Scene-graph seam
//!
//! The animation driver and the hit tester only talk to nodes through
//! [`SceneGraph`]. [`Scene`] is the in-memory implementation used by the
//! browser facade and the tests; a host engine can implement the trait over
//! its own node storage instead.

mod camera;
mod node;
mod property;

pub use camera::{Camera, Ray, Viewport};
pub use node::{Node, NodeId, Scene};
pub use property::{Field, Footprint, ScalarProperty, Transform, VectorProperty};

use crate::math::{Mat4, Vec3};

/// Access to node transforms owned by the host scene
pub trait SceneGraph {
    fn contains(&self, node: NodeId) -> bool;

    fn read_scalar(&self, node: NodeId, property: ScalarProperty) -> Option<f32>;

    /// Returns false when the node is gone or does not carry the property
    fn write_scalar(&mut self, node: NodeId, property: ScalarProperty, value: f32) -> bool;

    fn read_vector(&self, node: NodeId, property: VectorProperty) -> Option<Vec3>;

    fn write_vector(&mut self, node: NodeId, property: VectorProperty, value: Vec3) -> bool;

    fn is_visible(&self, node: NodeId) -> bool;

    /// Local-to-world matrix including all ancestors
    fn world_matrix(&self, node: NodeId) -> Option<Mat4>;

    fn local_position(&self, node: NodeId) -> Option<Vec3> {
        self.read_vector(node, VectorProperty::Position)
    }

    fn world_position(&self, node: NodeId) -> Option<Vec3> {
        self.world_matrix(node).map(|m| m.translation_part())
    }
}
