//! Point-configuration checks run before and after a fit.
//!
//! All tests work on Hartley-normalized coordinates so the tolerances are
//! independent of the pixel scale of either point set.

use gaze_core::{Mat3, Pt2, Real};

use crate::math::{normalize_points_2d, principal_spread, triangle_area2};
use crate::{DegeneracyKind, PointSet};

/// Ratio `λ_min / λ_max` of the scatter below which a cloud counts as a line.
const COLLINEAR_SPREAD_RATIO: Real = 1e-10;
/// Normalized doubled triangle area below which three points count as collinear.
const COLLINEAR_TRIPLE_AREA: Real = 1e-6;
/// `|det H| / ‖H‖³` below which a fitted matrix counts as singular.
const SINGULAR_DET_RATIO: Real = 1e-12;

/// Reject coincident or collinear configurations.
///
/// For projective fits (`minimal >= 4`) some four points must also be in
/// general position. A minimal set with three collinear points, or a larger
/// set with all but one point on a line, leaves the DLT underdetermined even
/// though the cloud as a whole spans the plane.
pub fn check_configuration(
    points: &[Pt2],
    minimal: usize,
    set: PointSet,
) -> Result<(), DegeneracyKind> {
    let (normalized, _) =
        normalize_points_2d(points).ok_or(DegeneracyKind::Coincident(set))?;

    let (max, min) = principal_spread(&normalized).ok_or(DegeneracyKind::Coincident(set))?;
    if max <= Real::EPSILON || min / max < COLLINEAR_SPREAD_RATIO {
        return Err(DegeneracyKind::Collinear(set));
    }

    if minimal > 3 && find_general_quad(&normalized).is_none() {
        if normalized.len() == minimal {
            if let Some(indices) = find_collinear_triple(&normalized) {
                return Err(DegeneracyKind::CollinearTriple { set, indices });
            }
        }
        return Err(DegeneracyKind::NoGeneralPosition(set));
    }
    Ok(())
}

fn is_collinear(a: &Pt2, b: &Pt2, c: &Pt2) -> bool {
    triangle_area2(a, b, c).abs() < COLLINEAR_TRIPLE_AREA
}

fn find_collinear_triple(points: &[Pt2]) -> Option<[usize; 3]> {
    let n = points.len();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                if is_collinear(&points[i], &points[j], &points[k]) {
                    return Some([i, j, k]);
                }
            }
        }
    }
    None
}

/// First four points with no three of them collinear.
fn find_general_quad(points: &[Pt2]) -> Option<[usize; 4]> {
    let n = points.len();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                if is_collinear(&points[i], &points[j], &points[k]) {
                    continue;
                }
                for l in k + 1..n {
                    let [a, b, c, d] = [&points[i], &points[j], &points[k], &points[l]];
                    if !is_collinear(a, b, d) && !is_collinear(a, c, d) && !is_collinear(b, c, d)
                    {
                        return Some([i, j, k, l]);
                    }
                }
            }
        }
    }
    None
}

/// Reject fitted matrices that cannot represent a usable mapping.
pub fn check_matrix(h: &Mat3) -> Result<(), DegeneracyKind> {
    if h.iter().any(|v| !v.is_finite()) {
        return Err(DegeneracyKind::NonFinite);
    }
    let scale = h.norm();
    if scale <= Real::EPSILON || h.determinant().abs() / scale.powi(3) < SINGULAR_DET_RATIO {
        return Err(DegeneracyKind::Singular);
    }
    Ok(())
}
