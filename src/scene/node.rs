use slotmap::{new_key_type, SlotMap};

use super::property::{ScalarProperty, Transform, VectorProperty};
use super::SceneGraph;
use crate::math::{Mat4, Vec3};

new_key_type! {
    /// Generational handle to a scene node; stays invalid once the node is removed
    pub struct NodeId;
}

/// A node in the scene hierarchy
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    /// Material opacity, 0.0 to 1.0
    pub opacity: f32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: &str, transform: Transform) -> Self {
        Self {
            name: name.to_string(),
            transform,
            visible: true,
            opacity: 1.0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// In-memory scene graph
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root-level node
    pub fn spawn(&mut self, name: &str, transform: Transform) -> NodeId {
        self.nodes.insert(Node::new(name, transform))
    }

    /// Add a node under `parent`; `None` if the parent is gone
    pub fn spawn_child(&mut self, parent: NodeId, name: &str, transform: Transform) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let child = self.spawn(name, transform);
        self.attach(child, parent);
        Some(child)
    }

    pub fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Remove a node and its whole subtree. Returns false if it was already gone.
    pub fn remove(&mut self, node: NodeId) -> bool {
        let Some(removed) = self.nodes.remove(node) else {
            return false;
        };

        if let Some(parent) = removed.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&c| c != node);
        }

        let mut stack = removed.children;
        while let Some(id) = stack.pop() {
            if let Some(child) = self.nodes.remove(id) {
                stack.extend(child.children);
            }
        }
        true
    }

    /// Re-parent `child` under `parent`, keeping its local transform.
    ///
    /// Refuses to create cycles or to attach a node to itself.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> bool {
        if child == parent || !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            return false;
        }

        self.detach(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Move `node` to the root level, keeping its local transform
    pub fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return false;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = None;
        }
        true
    }

    /// Re-parent `child` under `parent` so it stays where it is in world
    /// space; its local transform is rewritten relative to the new parent.
    ///
    /// False, with nothing changed, when `attach` would refuse or either
    /// world matrix cannot be inverted or split.
    pub fn attach_keeping_world(&mut self, child: NodeId, parent: NodeId) -> bool {
        let local = self
            .world_matrix(parent)
            .and_then(|m| m.inverse())
            .zip(self.world_matrix(child))
            .and_then(|(parent_inv, world)| parent_inv.mul(&world).decompose());
        let Some(local) = local else {
            return false;
        };
        if !self.attach(child, parent) {
            return false;
        }
        self.set_local(child, local)
    }

    /// Move `node` to the root level without changing its world transform
    pub fn detach_keeping_world(&mut self, node: NodeId) -> bool {
        let Some(local) = self.world_matrix(node).and_then(|m| m.decompose()) else {
            return false;
        };
        if !self.detach(node) {
            return false;
        }
        self.set_local(node, local)
    }

    fn set_local(&mut self, node: NodeId, (position, rotation, scale): (Vec3, Vec3, Vec3)) -> bool {
        match self.nodes.get_mut(node) {
            Some(n) => {
                n.transform = Transform { position, rotation, scale };
                true
            }
            None => false,
        }
    }

    /// True if `ancestor` is `node` or appears on its parent chain
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    pub fn transform(&self, node: NodeId) -> Option<Transform> {
        self.nodes.get(node).map(|n| n.transform)
    }

    pub fn set_position(&mut self, node: NodeId, position: Vec3) -> bool {
        self.write_vector(node, VectorProperty::Position, position)
    }

    pub fn set_rotation(&mut self, node: NodeId, rotation: Vec3) -> bool {
        self.write_vector(node, VectorProperty::Rotation, rotation)
    }

    pub fn set_scale(&mut self, node: NodeId, scale: Vec3) -> bool {
        self.write_vector(node, VectorProperty::Scale, scale)
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> bool {
        match self.nodes.get_mut(node) {
            Some(n) => {
                n.visible = visible;
                true
            }
            None => false,
        }
    }
}

impl SceneGraph for Scene {
    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn read_scalar(&self, node: NodeId, property: ScalarProperty) -> Option<f32> {
        let n = self.nodes.get(node)?;
        match property {
            ScalarProperty::Opacity => Some(n.opacity),
            _ => n.transform.scalar(property),
        }
    }

    fn write_scalar(&mut self, node: NodeId, property: ScalarProperty, value: f32) -> bool {
        let Some(n) = self.nodes.get_mut(node) else {
            return false;
        };
        match property {
            ScalarProperty::Opacity => {
                n.opacity = value;
                true
            }
            _ => n.transform.set_scalar(property, value),
        }
    }

    fn read_vector(&self, node: NodeId, property: VectorProperty) -> Option<Vec3> {
        self.nodes.get(node).map(|n| n.transform.vector(property))
    }

    fn write_vector(&mut self, node: NodeId, property: VectorProperty, value: Vec3) -> bool {
        match self.nodes.get_mut(node) {
            Some(n) => {
                n.transform.set_vector(property, value);
                true
            }
            None => false,
        }
    }

    /// A node is shown only if it and every ancestor are visible
    fn is_visible(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.nodes.get(id) {
                Some(n) if n.visible => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn world_matrix(&self, node: NodeId) -> Option<Mat4> {
        let mut world = self.nodes.get(node)?.transform.matrix();
        let mut parent = self.nodes.get(node)?.parent;
        while let Some(id) = parent {
            let p = self.nodes.get(id)?;
            world = p.transform.matrix().mul(&world);
            parent = p.parent;
        }
        Some(world)
    }
}
