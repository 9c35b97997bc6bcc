//! Points and paths on a sphere
//!
//! Used for globe-style scenes where markers sit on the surface and
//! travellers follow the great circle between two of them.

use super::{Quat, Vec3};

/// Convert geographic coordinates (degrees) to a point on a sphere of `radius`.
///
/// Longitude 0 faces -X after the 180 degree offset, matching equirectangular
/// textures wrapped onto a standard sphere mesh.
pub fn lat_lon_to_point(latitude: f32, longitude: f32, radius: f32) -> Vec3 {
    let phi = latitude.to_radians();
    let lambda = (longitude - 180.0).to_radians();

    Vec3::new(
        -radius * phi.cos() * lambda.cos(),
        radius * phi.sin(),
        radius * phi.cos() * lambda.sin(),
    )
}

/// Point on the great circle from `from` to `to` at parameter `t`.
///
/// Directions are spherically interpolated, the distance from the origin is
/// linearly interpolated. `t <= 0` and `t >= 1` return the endpoints as given.
pub fn geodesic_point(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    if t <= 0.0 {
        return from;
    }
    if t >= 1.0 {
        return to;
    }

    let r0 = from.length();
    let r1 = to.length();
    let radius = r0 + (r1 - r0) * t;
    if r0 == 0.0 || r1 == 0.0 {
        return from.lerp(&to, t);
    }

    let a = from.scale(1.0 / r0);
    let b = to.scale(1.0 / r1);
    let cos_omega = a.dot(&b).clamp(-1.0, 1.0);

    let dir = if cos_omega > 0.9995 {
        a.lerp(&b, t).normalize()
    } else if cos_omega < -0.9995 {
        // antipodal: any great circle works, pick one through a stable perpendicular
        let axis = a.perpendicular();
        Quat::from_axis_angle(axis, std::f32::consts::PI * t).rotate(a)
    } else {
        let omega = cos_omega.acos();
        let sin_omega = omega.sin();
        let wa = ((1.0 - t) * omega).sin() / sin_omega;
        let wb = (t * omega).sin() / sin_omega;
        (a.scale(wa) + b.scale(wb)).normalize()
    };

    dir.scale(radius)
}

/// Closed route visiting surface waypoints in order at a fixed altitude
#[derive(Debug, Clone)]
pub struct GeodesicRoute {
    waypoints: Vec<Vec3>,
    altitude: f32,
    leg_ms: f64,
}

impl GeodesicRoute {
    /// `waypoints` are directions from the sphere centre; `altitude` is the
    /// travel radius; each leg lasts `leg_ms`.
    pub fn new(waypoints: Vec<Vec3>, altitude: f32, leg_ms: f64) -> Self {
        Self {
            waypoints: waypoints.into_iter().map(|p| p.normalize()).collect(),
            altitude,
            leg_ms,
        }
    }

    /// Route through geographic `(latitude, longitude)` pairs
    pub fn from_lat_lon(points: &[(f32, f32)], altitude: f32, leg_ms: f64) -> Self {
        let waypoints = points
            .iter()
            .map(|&(lat, lon)| lat_lon_to_point(lat, lon, 1.0))
            .collect();
        Self::new(waypoints, altitude, leg_ms)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn altitude(&self) -> f32 {
        self.altitude
    }

    pub fn leg_ms(&self) -> f64 {
        self.leg_ms
    }

    /// Endpoint of waypoint `index` at travel altitude
    pub fn waypoint(&self, index: usize) -> Option<Vec3> {
        self.waypoints.get(index).map(|d| d.scale(self.altitude))
    }

    /// Orientation of a traveller over waypoint `index`: the rotation
    /// taking +Z onto the waypoint's direction
    pub fn heading(&self, index: usize) -> Option<Quat> {
        self.waypoints
            .get(index)
            .map(|&d| Quat::from_unit_vectors(Vec3::FORWARD, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lon_poles_and_equator() {
        let north = lat_lon_to_point(90.0, 0.0, 1.5);
        assert!((north.y - 1.5).abs() < 0.0001);

        let equator = lat_lon_to_point(0.0, 0.0, 1.0);
        assert!(equator.y.abs() < 0.0001);
        assert!((equator.x - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_geodesic_stays_on_sphere() {
        let a = lat_lon_to_point(35.68, 139.76, 1.6);
        let b = lat_lon_to_point(40.71, -74.0, 1.6);
        for i in 0..=10 {
            let p = geodesic_point(a, b, i as f32 / 10.0);
            assert!((p.length() - 1.6).abs() < 0.001);
        }
    }

    #[test]
    fn test_geodesic_endpoints_exact() {
        let a = Vec3::new(0.1, 0.7, 0.3);
        let b = Vec3::new(-0.4, 0.2, 0.9);
        assert_eq!(geodesic_point(a, b, 0.0), a);
        assert_eq!(geodesic_point(a, b, 1.0), b);
    }

    #[test]
    fn test_geodesic_midpoint_quarter_arc() {
        let p = geodesic_point(Vec3::RIGHT, Vec3::UP, 0.5);
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert!(p.distance(&Vec3::new(s, s, 0.0)) < 0.0001);
    }

    #[test]
    fn test_geodesic_antipodal() {
        let p = geodesic_point(Vec3::FORWARD, -Vec3::FORWARD, 0.5);
        assert!((p.length() - 1.0).abs() < 0.0001);
        assert!(p.dot(&Vec3::FORWARD).abs() < 0.0001);
    }

    #[test]
    fn test_route_from_lat_lon() {
        let route = GeodesicRoute::from_lat_lon(&[(0.0, 0.0), (90.0, 0.0)], 2.0, 1000.0);
        assert_eq!(route.len(), 2);
        assert!(route.waypoint(0).unwrap().distance(&Vec3::new(2.0, 0.0, 0.0)) < 0.0001);
        assert!(route.waypoint(1).unwrap().distance(&Vec3::new(0.0, 2.0, 0.0)) < 0.0001);
        assert!(route.waypoint(2).is_none());
    }

    #[test]
    fn test_heading_faces_waypoint() {
        let route = GeodesicRoute::new(vec![Vec3::RIGHT, Vec3::new(0.0, 3.0, 0.0)], 2.0, 1000.0);
        let q = route.heading(1).unwrap();
        assert!(q.rotate(Vec3::FORWARD).distance(&Vec3::UP) < 0.0001);
        assert!(route.heading(2).is_none());
    }
}
