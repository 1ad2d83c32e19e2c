pub mod intersect_2d;
pub mod plane;
pub mod position_key;

pub use plane::{Plane, PlaneFrame};
pub use position_key::{EdgeKey, PositionKey};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Rounds every component of `v` to `decimals` decimal places.
#[must_use]
pub fn round_vector(v: &Vector3, decimals: i32) -> Vector3 {
    let scale = 10_f64.powi(decimals);
    v.map(|c| (c * scale).round() / scale)
}

/// Unit vector perpendicular to the line through `a` and `b`, pointing
/// from the line towards `point`.
///
/// Returns `None` if the line is degenerate or `point` lies on it.
#[must_use]
pub fn perpendicular_towards(a: &Point3, b: &Point3, point: &Point3) -> Option<Vector3> {
    let dir = (b - a).try_normalize(TOLERANCE)?;
    let to_point = point - a;
    let foot = a + dir * to_point.dot(&dir);
    (point - foot).try_normalize(TOLERANCE)
}

/// Arithmetic mean of two vectors.
#[must_use]
pub fn average(a: &Vector3, b: &Vector3) -> Vector3 {
    (a + b) * 0.5
}
