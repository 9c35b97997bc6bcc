use crate::math::Vec3;
use crate::scene::{NodeId, SceneGraph};

/// Bounds a node is hit-tested against, in the node's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickShape {
    Sphere { radius: f32 },
    /// Axis-aligned box centred on the node origin
    Box { half_extents: Vec3 },
    /// Flat card in the local XY plane, facing +Z
    Quad { half_width: f32, half_height: f32 },
}

/// What a node means to the interaction layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeTag {
    #[default]
    Plain,
    /// Ends the flow when chosen (the last card, a closing marker)
    Terminal,
    /// Position within an ordered set such as a carousel
    Slot(usize),
    /// Returns from the settled view
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickEntry {
    pub node: NodeId,
    pub shape: PickShape,
    pub tag: NodeTag,
}

impl PickEntry {
    pub fn new(node: NodeId, shape: PickShape) -> Self {
        Self {
            node,
            shape,
            tag: NodeTag::Plain,
        }
    }

    pub fn tagged(mut self, tag: NodeTag) -> Self {
        self.tag = tag;
        self
    }
}

/// Ordered set of pickable nodes
#[derive(Debug, Clone, Default)]
pub struct PickableRegistry {
    entries: Vec<PickEntry>,
}

impl PickableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. An existing entry for the same node is updated in place
    /// and `false` is returned.
    pub fn insert(&mut self, entry: PickEntry) -> bool {
        match self.entries.iter_mut().find(|e| e.node == entry.node) {
            Some(existing) => {
                *existing = entry;
                false
            }
            None => {
                self.entries.push(entry);
                true
            }
        }
    }

    pub fn remove(&mut self, node: NodeId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.node != node);
        before != self.entries.len()
    }

    /// Swap in a new active subset; later duplicates of a node are ignored
    pub fn replace_all<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = PickEntry>,
    {
        self.entries.clear();
        for entry in entries {
            if !self.contains(entry.node) {
                self.entries.push(entry);
            }
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.iter().any(|e| e.node == node)
    }

    pub fn get(&self, node: NodeId) -> Option<&PickEntry> {
        self.entries.iter().find(|e| e.node == node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PickEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Forget entries whose node left the scene; returns how many were dropped
    pub fn retain_live<S: SceneGraph + ?Sized>(&mut self, scene: &S) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| scene.contains(e.node));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Scene, Transform};

    fn sphere() -> PickShape {
        PickShape::Sphere { radius: 1.0 }
    }

    #[test]
    fn test_insert_no_duplicates() {
        let mut scene = Scene::new();
        let a = scene.spawn("a", Transform::default());
        let mut reg = PickableRegistry::new();

        assert!(reg.insert(PickEntry::new(a, sphere())));
        assert!(!reg.insert(PickEntry::new(a, sphere()).tagged(NodeTag::Terminal)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(a).unwrap().tag, NodeTag::Terminal);
    }

    #[test]
    fn test_replace_all_keeps_order() {
        let mut scene = Scene::new();
        let ids: Vec<NodeId> = (0..3).map(|i| scene.spawn(&format!("n{}", i), Transform::default())).collect();
        let mut reg = PickableRegistry::new();
        reg.insert(PickEntry::new(ids[0], sphere()));

        reg.replace_all([ids[2], ids[1], ids[2]].iter().map(|&n| PickEntry::new(n, sphere())));
        let order: Vec<NodeId> = reg.iter().map(|e| e.node).collect();
        assert_eq!(order, vec![ids[2], ids[1]]);
        assert!(!reg.contains(ids[0]));
    }

    #[test]
    fn test_retain_live() {
        let mut scene = Scene::new();
        let a = scene.spawn("a", Transform::default());
        let b = scene.spawn("b", Transform::default());
        let mut reg = PickableRegistry::new();
        reg.insert(PickEntry::new(a, sphere()));
        reg.insert(PickEntry::new(b, sphere()));

        scene.remove(a);
        assert_eq!(reg.retain_live(&scene), 1);
        assert!(reg.contains(b));
        assert!(reg.remove(b));
        assert!(reg.is_empty());
    }
}
