pub mod vec3;
pub mod matrix;
pub mod quat;
pub mod geo;

pub use vec3::{Axis, Vec3};
pub use matrix::Mat4;
pub use quat::Quat;
pub use geo::{geodesic_point, lat_lon_to_point, GeodesicRoute};
