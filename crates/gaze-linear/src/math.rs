//! Numerical conditioning helpers shared by the linear solvers.
//!
//! # Hartley Normalization
//!
//! Centering the points and scaling them so the mean distance from the origin
//! is `√2` keeps the DLT design matrix well conditioned regardless of whether
//! the inputs are scene-camera pixels or screen pixels.
//!
//! ```
//! use gaze_core::Pt2;
//! use gaze_linear::math::normalize_points_2d;
//!
//! let points = [Pt2::new(100.0, 200.0), Pt2::new(150.0, 250.0), Pt2::new(120.0, 220.0)];
//! let (normalized, t) = normalize_points_2d(&points).unwrap();
//! assert_eq!(normalized.len(), 3);
//! assert_eq!(t[(2, 2)], 1.0);
//! ```

use gaze_core::{mean_point, Mat3, Pt2, Real};

/// Hartley normalization for 2D points.
///
/// Returns the normalized points and the similarity `T` with
/// `p_norm = T · p_homogeneous`, or `None` when the input is empty or all
/// points coincide.
///
/// Reference: Hartley & Zisserman, "Multiple View Geometry", Algorithm 4.2.
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    let c = mean_point(points)?;
    let mean_dist =
        points.iter().map(|p| (*p - c).norm()).sum::<Real>() / points.len() as Real;
    if mean_dist <= Real::EPSILON || !mean_dist.is_finite() {
        return None;
    }

    let s = Real::sqrt(2.0) / mean_dist;
    #[rustfmt::skip]
    let t = Mat3::new(
        s,   0.0, -s * c.x,
        0.0, s,   -s * c.y,
        0.0, 0.0, 1.0,
    );
    let normalized = points
        .iter()
        .map(|p| Pt2::new(s * (p.x - c.x), s * (p.y - c.y)))
        .collect();
    Some((normalized, t))
}

/// Eigenvalues `(λ_max, λ_min)` of the 2×2 scatter matrix of centred points.
///
/// A vanishing `λ_min` relative to `λ_max` means the cloud lies on a line.
pub fn principal_spread(points: &[Pt2]) -> Option<(Real, Real)> {
    let c = mean_point(points)?;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let (dx, dy) = (p.x - c.x, p.y - c.y);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    let n = points.len() as Real;
    let (sxx, sxy, syy) = (sxx / n, sxy / n, syy / n);

    let half_trace = 0.5 * (sxx + syy);
    let disc = (0.25 * (sxx - syy) * (sxx - syy) + sxy * sxy).sqrt();
    Some((half_trace + disc, (half_trace - disc).max(0.0)))
}

/// Twice the signed area of the triangle `(a, b, c)`.
pub fn triangle_area2(a: &Pt2, b: &Pt2, c: &Pt2) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
