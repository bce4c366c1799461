use nalgebra::{Point3, Vector3};

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// A zero-length vector yields 0.
#[inline]
pub fn angle_degrees(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    v1.angle(v2).to_degrees()
}

/// Squared distance from `point` to the axis-aligned box spanned by `begin`
/// and `end`; zero when the point is inside.
pub fn brick_distance_sqr(begin: &Point3<f64>, end: &Point3<f64>, point: &Point3<f64>) -> f64 {
    (0..3)
        .map(|i| {
            let closest = point[i].clamp(begin[i], end[i]);
            (closest - point[i]).powi(2)
        })
        .sum()
}
