use std::cmp::Ordering;

use super::registry::{NodeTag, PickShape, PickableRegistry};
use crate::math::{Axis, Vec3};
use crate::scene::{Camera, NodeId, Ray, SceneGraph, Viewport};

/// A ray hitting one registered node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    pub tag: NodeTag,
    /// Ray parameter; world units along the normalized camera ray
    pub distance: f32,
    pub point: Vec3,
    /// The node's position relative to its parent
    pub local_position: Vec3,
}

/// Accepts or rejects a raw hit
pub type HitFilter<'a> = &'a dyn Fn(&Hit) -> bool;

/// Ray-based picking over a [`PickableRegistry`]
#[derive(Debug, Clone, Copy)]
pub struct HitTester {
    /// Hits further than this along the ray are ignored
    max_distance: f32,
}

impl HitTester {
    pub fn new() -> Self {
        Self {
            max_distance: f32::INFINITY,
        }
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Cast a ray from screen coordinates and return the closest hit the
    /// filter accepts (every hit when `filter` is `None`)
    #[allow(clippy::too_many_arguments)]
    pub fn pick<S: SceneGraph + ?Sized>(
        &self,
        screen_x: f32,
        screen_y: f32,
        viewport: Viewport,
        camera: &Camera,
        registry: &PickableRegistry,
        scene: &S,
        filter: Option<HitFilter<'_>>,
    ) -> Option<Hit> {
        let ray = camera.ray_from_screen(screen_x, screen_y, viewport);
        self.pick_ray(&ray, registry, scene, filter)
    }

    /// Same as [`HitTester::pick`] for a ray the caller already unprojected
    pub fn pick_ray<S: SceneGraph + ?Sized>(
        &self,
        ray: &Ray,
        registry: &PickableRegistry,
        scene: &S,
        filter: Option<HitFilter<'_>>,
    ) -> Option<Hit> {
        self.intersect_all(ray, registry, scene)
            .into_iter()
            .find(|hit| filter.map_or(true, |accept| accept(hit)))
    }

    /// Every raw intersection, nearest first
    pub fn pick_all<S: SceneGraph + ?Sized>(
        &self,
        screen_x: f32,
        screen_y: f32,
        viewport: Viewport,
        camera: &Camera,
        registry: &PickableRegistry,
        scene: &S,
    ) -> Vec<Hit> {
        let ray = camera.ray_from_screen(screen_x, screen_y, viewport);
        self.intersect_all(&ray, registry, scene)
    }

    pub fn intersect_all<S: SceneGraph + ?Sized>(
        &self,
        ray: &Ray,
        registry: &PickableRegistry,
        scene: &S,
    ) -> Vec<Hit> {
        let mut hits = Vec::new();

        for entry in registry.iter() {
            if !scene.contains(entry.node) || !scene.is_visible(entry.node) {
                continue;
            }
            // Singular matrices (zero scale) have no volume to hit
            let Some(inverse) = scene.world_matrix(entry.node).and_then(|m| m.inverse()) else {
                continue;
            };

            // Direction is not renormalized, so t is shared with the world ray
            let local = ray.transformed(&inverse);
            let t = match entry.shape {
                PickShape::Sphere { radius } => {
                    ray_sphere_intersect(local.origin, local.direction, Vec3::ZERO, radius)
                }
                PickShape::Box { half_extents } => {
                    ray_box_intersect(local.origin, local.direction, half_extents)
                }
                PickShape::Quad { half_width, half_height } => {
                    ray_quad_intersect(local.origin, local.direction, half_width, half_height)
                }
            };

            if let Some(t) = t.filter(|t| *t <= self.max_distance) {
                hits.push(Hit {
                    node: entry.node,
                    tag: entry.tag,
                    distance: t,
                    point: ray.at(t),
                    local_position: scene.local_position(entry.node).unwrap_or(Vec3::ZERO),
                });
            }
        }

        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        hits
    }
}

impl Default for HitTester {
    fn default() -> Self {
        Self::new()
    }
}

/// Ray-sphere intersection test
fn ray_sphere_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    sphere_center: Vec3,
    sphere_radius: f32,
) -> Option<f32> {
    let oc = ray_origin - sphere_center;

    let a = ray_dir.dot(&ray_dir);
    let b = 2.0 * oc.dot(&ray_dir);
    let c = oc.dot(&oc) - sphere_radius * sphere_radius;

    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 || a == 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / (2.0 * a);

    if t > 0.0 {
        Some(t)
    } else {
        let t2 = (-b + discriminant.sqrt()) / (2.0 * a);
        if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }
}

/// Slab test against a box centred on the origin
fn ray_box_intersect(ray_origin: Vec3, ray_dir: Vec3, half_extents: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in Axis::ALL {
        let o = ray_origin.get(axis);
        let d = ray_dir.get(axis);
        let h = half_extents.get(axis);

        if d.abs() < 1e-8 {
            if o < -h || o > h {
                return None;
            }
            continue;
        }

        let mut t0 = (-h - o) / d;
        let mut t1 = (h - o) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far <= 0.0 {
        None
    } else if t_near > 0.0 {
        Some(t_near)
    } else {
        Some(t_far)
    }
}

/// Rectangle in the z = 0 plane, hit from either side
fn ray_quad_intersect(ray_origin: Vec3, ray_dir: Vec3, half_width: f32, half_height: f32) -> Option<f32> {
    if ray_dir.z.abs() < 1e-8 {
        return None;
    }
    let t = -ray_origin.z / ray_dir.z;
    if t <= 0.0 {
        return None;
    }
    let p = ray_origin + ray_dir.scale(t);
    if p.x.abs() <= half_width && p.y.abs() <= half_height {
        Some(t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PickEntry;
    use crate::scene::{Scene, Transform};

    fn camera() -> (Camera, Viewport) {
        let mut cam = Camera::default();
        let vp = Viewport::new(800.0, 600.0);
        cam.set_aspect(vp.aspect());
        (cam, vp)
    }

    #[test]
    fn test_ray_sphere_hit() {
        // Ray pointing directly at sphere
        let result = ray_sphere_intersect(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::ZERO,
            1.0,
        );

        assert!(result.is_some());
        let dist = result.unwrap();
        assert!((dist - 9.0).abs() < 0.001);
    }

    #[test]
    fn test_ray_sphere_miss() {
        // Ray pointing away from sphere
        let result = ray_sphere_intersect(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::ZERO,
            1.0,
        );

        assert!(result.is_none());
    }

    #[test]
    fn test_ray_sphere_offset() {
        // Ray that misses by going to the side
        let result = ray_sphere_intersect(
            Vec3::new(5.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::ZERO,
            1.0,
        );

        assert!(result.is_none());
    }

    #[test]
    fn test_ray_box_from_inside() {
        let t = ray_box_intersect(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5)).unwrap();
        assert!((t - 0.5).abs() < 0.0001);
        assert!(ray_box_intersect(Vec3::new(0.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0), Vec3::splat(0.5)).is_none());
    }

    #[test]
    fn test_pick_nearest() {
        let mut scene = Scene::new();
        let near = scene.spawn("near", Transform::at(Vec3::new(0.0, 0.0, 1.0)));
        let far = scene.spawn("far", Transform::at(Vec3::new(0.0, 0.0, -1.0)));
        let mut reg = PickableRegistry::new();
        reg.insert(PickEntry::new(far, PickShape::Sphere { radius: 0.5 }));
        reg.insert(PickEntry::new(near, PickShape::Sphere { radius: 0.5 }));

        let (cam, vp) = camera();
        let hit = HitTester::new().pick(400.0, 300.0, vp, &cam, &reg, &scene, None).unwrap();
        assert_eq!(hit.node, near);
        assert!((hit.distance - 2.5).abs() < 0.001);

        let all = HitTester::new().pick_all(400.0, 300.0, vp, &cam, &reg, &scene);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].node, far);
    }

    #[test]
    fn test_filter_rejects_all() {
        let mut scene = Scene::new();
        let node = scene.spawn("a", Transform::default());
        let mut reg = PickableRegistry::new();
        reg.insert(PickEntry::new(node, PickShape::Sphere { radius: 1.0 }));

        let (cam, vp) = camera();
        let reject: &dyn Fn(&Hit) -> bool = &|_| false;
        assert!(HitTester::new().pick(400.0, 300.0, vp, &cam, &reg, &scene, Some(reject)).is_none());
        assert!(HitTester::new().pick(0.0, 0.0, vp, &cam, &reg, &scene, None).is_none());
    }

    #[test]
    fn test_rear_face_filtered_by_local_z() {
        let mut scene = Scene::new();
        let card = scene.spawn("card", Transform::default());
        let face = scene.spawn_child(card, "face", Transform::default()).unwrap();
        let rear = scene
            .spawn_child(card, "rear", Transform::at(Vec3::new(0.0, 0.0, 0.05)))
            .unwrap();

        let quad = PickShape::Quad { half_width: 0.5, half_height: 0.7 };
        let mut reg = PickableRegistry::new();
        reg.insert(PickEntry::new(rear, quad));
        reg.insert(PickEntry::new(face, quad).tagged(NodeTag::Slot(0)));

        let (cam, vp) = camera();
        let front_only: &dyn Fn(&Hit) -> bool = &|hit| hit.local_position.z.abs() < 0.01;
        let tester = HitTester::new();

        assert_eq!(tester.pick(400.0, 300.0, vp, &cam, &reg, &scene, None).unwrap().node, rear);
        let hit = tester.pick(400.0, 300.0, vp, &cam, &reg, &scene, Some(front_only)).unwrap();
        assert_eq!(hit.node, face);
        assert_eq!(hit.tag, NodeTag::Slot(0));
    }

    #[test]
    fn test_rotated_box_uses_local_space() {
        let mut scene = Scene::new();
        // 2 wide along local X, turned so local X points down the view axis
        let beam = scene.spawn(
            "beam",
            Transform::default().with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0)),
        );
        let mut reg = PickableRegistry::new();
        reg.insert(PickEntry::new(beam, PickShape::Box { half_extents: Vec3::new(2.0, 0.1, 0.1) }));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = HitTester::new().pick_ray(&ray, &reg, &scene, None).unwrap();
        assert!((hit.distance - 2.0).abs() < 0.001);
        assert!(hit.point.distance(&Vec3::new(0.0, 0.0, 2.0)) < 0.001);
    }

    #[test]
    fn test_hidden_and_collapsed_nodes_skipped() {
        let mut scene = Scene::new();
        let hidden = scene.spawn("hidden", Transform::default());
        let collapsed = scene.spawn("collapsed", Transform::default().with_scale(Vec3::ZERO));
        let gone = scene.spawn("gone", Transform::default());
        scene.set_visible(hidden, false);

        let mut reg = PickableRegistry::new();
        for node in [hidden, collapsed, gone] {
            reg.insert(PickEntry::new(node, PickShape::Sphere { radius: 1.0 }));
        }
        scene.remove(gone);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(HitTester::new().intersect_all(&ray, &reg, &scene).is_empty());
    }

    #[test]
    fn test_max_distance() {
        let mut scene = Scene::new();
        let node = scene.spawn("a", Transform::default());
        let mut reg = PickableRegistry::new();
        reg.insert(PickEntry::new(node, PickShape::Sphere { radius: 1.0 }));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(HitTester::new().with_max_distance(5.0).pick_ray(&ray, &reg, &scene, None).is_none());
    }
}
