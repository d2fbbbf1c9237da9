//! Homography estimation (plane-to-plane projective transform).
//!
//! The homography `H` maps **gaze points** (undistorted scene-camera pixels)
//! to **screen points**: `s ~ H g`. Normalization is applied internally and
//! the returned matrix is de-normalized.

use gaze_core::{Mat3, Pt2};
use nalgebra::DMatrix;

use crate::math::normalize_points_2d;
use crate::{DegeneracyKind, FitError, PointSet};

/// Minimum number of correspondences for a projective fit.
pub const HOMOGRAPHY_MIN_PAIRS: usize = 4;

/// Estimate `H` such that `dst ~ H src` using the normalized DLT.
///
/// Uses Hartley normalization on both point sets and solves `A h = 0` via
/// SVD on the `2n × 9` design matrix. With exactly four points the result is
/// exact; with more it is the algebraic least-squares solution. The output is
/// scaled so that `H[2,2] == 1` when possible.
///
/// This routine does not check for collinear configurations; see
/// [`check_configuration`](crate::check_configuration).
pub fn dlt_homography(src: &[Pt2], dst: &[Pt2]) -> Result<Mat3, FitError> {
    let n = src.len();
    if dst.len() != n {
        return Err(FitError::MismatchedLengths {
            src: n,
            dst: dst.len(),
        });
    }
    if n < HOMOGRAPHY_MIN_PAIRS {
        return Err(FitError::NotEnoughData {
            needed: HOMOGRAPHY_MIN_PAIRS,
            got: n,
        });
    }

    let (src_n, t_s) =
        normalize_points_2d(src).ok_or(DegeneracyKind::Coincident(PointSet::Gaze))?;
    let (dst_n, t_d) =
        normalize_points_2d(dst).ok_or(DegeneracyKind::Coincident(PointSet::Screen))?;

    let mut a = DMatrix::<f64>::zeros(2 * n, 9);
    for (i, (g, s)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y) = (g.x, g.y);
        let (u, v) = (s.x, s.y);
        let r0 = 2 * i;
        let r1 = r0 + 1;

        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = u * x;
        a[(r0, 7)] = u * y;
        a[(r0, 8)] = u;

        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = v * x;
        a[(r1, 7)] = v * y;
        a[(r1, 8)] = v;
    }

    // Four points give an 8×9 system; pad so the SVD returns a full V.
    if a.nrows() < a.ncols() {
        let (rows, cols) = a.shape();
        let mut padded = DMatrix::<f64>::zeros(cols, cols);
        padded.view_mut((0, 0), (rows, cols)).copy_from(&a);
        a = padded;
    }

    let svd = a.svd(false, true);
    let v_t = svd.v_t.ok_or(FitError::SvdFailed)?;
    let (min_idx, _) = svd.singular_values.argmin();
    let h_vec = v_t.row(min_idx);

    let h_n = Mat3::from_fn(|r, c| h_vec[3 * r + c]);
    let t_d_inv = t_d.try_inverse().ok_or(FitError::NonInvertible)?;
    let mut h = t_d_inv * h_n * t_s;

    let scale = h[(2, 2)];
    if scale.abs() > f64::EPSILON {
        h /= scale;
    }
    Ok(h)
}
