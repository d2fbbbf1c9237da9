//! Least-squares affine fit `dst ≈ A src + t`.

use gaze_core::{Mat3, Pt2};
use nalgebra::{DMatrix, DVector};

use crate::math::normalize_points_2d;
use crate::{DegeneracyKind, FitError, PointSet};

/// Minimum number of correspondences for an affine fit.
pub const AFFINE_MIN_PAIRS: usize = 3;

const SOLVE_EPS: f64 = 1e-12;

/// Estimate an affine transform `dst ≈ M src` and return it as a 3×3 matrix
/// with last row `[0, 0, 1]`.
///
/// Both point sets are Hartley-normalized; the two output rows are solved
/// independently as linear least squares via SVD.
pub fn fit_affine(src: &[Pt2], dst: &[Pt2]) -> Result<Mat3, FitError> {
    let n = src.len();
    if dst.len() != n {
        return Err(FitError::MismatchedLengths {
            src: n,
            dst: dst.len(),
        });
    }
    if n < AFFINE_MIN_PAIRS {
        return Err(FitError::NotEnoughData {
            needed: AFFINE_MIN_PAIRS,
            got: n,
        });
    }

    let (src_n, t_s) =
        normalize_points_2d(src).ok_or(DegeneracyKind::Coincident(PointSet::Gaze))?;
    let (dst_n, t_d) =
        normalize_points_2d(dst).ok_or(DegeneracyKind::Coincident(PointSet::Screen))?;

    let a = DMatrix::<f64>::from_fn(n, 3, |r, c| match c {
        0 => src_n[r].x,
        1 => src_n[r].y,
        _ => 1.0,
    });
    let bx = DVector::<f64>::from_iterator(n, dst_n.iter().map(|p| p.x));
    let by = DVector::<f64>::from_iterator(n, dst_n.iter().map(|p| p.y));

    let svd = a.svd(true, true);
    let row_x = svd.solve(&bx, SOLVE_EPS).map_err(|_| FitError::SvdFailed)?;
    let row_y = svd.solve(&by, SOLVE_EPS).map_err(|_| FitError::SvdFailed)?;

    #[rustfmt::skip]
    let m_n = Mat3::new(
        row_x[0], row_x[1], row_x[2],
        row_y[0], row_y[1], row_y[2],
        0.0,      0.0,      1.0,
    );
    let t_d_inv = t_d.try_inverse().ok_or(FitError::NonInvertible)?;
    Ok(t_d_inv * m_n * t_s)
}
