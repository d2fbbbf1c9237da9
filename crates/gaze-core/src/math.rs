//! Mathematical utilities and type definitions.
//!
//! Fundamental types used throughout the workspace and the homogeneous
//! coordinate helpers shared by the fitters and the runtime cursor.

use nalgebra::{Matrix3, Point2, Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;

/// Convert a 2D point in Euclidean coordinates into homogeneous coordinates.
///
/// Given a point `p = (x, y)`, returns the homogeneous vector `(x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector back to a 2D point.
///
/// Returns `None` when the scale component vanishes (the point lies on the
/// line at infinity) or the result is not finite.
pub fn from_homogeneous(v: &Vec3) -> Option<Pt2> {
    if v.z.abs() <= Real::EPSILON {
        return None;
    }
    let p = Pt2::new(v.x / v.z, v.y / v.z);
    (p.x.is_finite() && p.y.is_finite()).then_some(p)
}

/// Component-wise arithmetic mean of a set of points.
///
/// Returns `None` for an empty slice.
pub fn mean_point(points: &[Pt2]) -> Option<Pt2> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as Real;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Pt2::new(sx / n, sy / n))
}

/// Build a 3×3 matrix from a row-major nested array.
pub fn mat3_from_rows(rows: &[[Real; 3]; 3]) -> Mat3 {
    Mat3::new(
        rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
        rows[2][1], rows[2][2],
    )
}

/// Export a 3×3 matrix as a row-major nested array.
pub fn mat3_to_rows(m: &Mat3) -> [[Real; 3]; 3] {
    [
        [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
        [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
        [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
    ]
}
