//! Coordinate transformation utilities for the scene camera.
//!
//! Conversions between pixel and normalized coordinates, and removal or
//! application of a distortion model on pixel coordinates.

use crate::{DistortionModel, PinholeIntrinsics, Pt2, Vec2};

/// Undistort a pixel and re-project it through the same intrinsics.
///
/// # Algorithm
/// 1. Normalize: `n_d = K⁻¹ · [u, v, 1]ᵀ`
/// 2. Invert the distortion iteratively: `n_u = undistort(n_d)`
/// 3. Re-project: `pixel = K · [n_u, 1]ᵀ`
///
/// The result lives in the same pixel frame as the input, so a pixel at the
/// principal point is returned unchanged.
pub fn undistort_pixel<D: DistortionModel + ?Sized>(
    pixel: &Pt2,
    intrinsics: &PinholeIntrinsics,
    distortion: &D,
) -> Pt2 {
    let n_dist = intrinsics.pixel_to_normalized(pixel);
    let n_undist = distortion.undistort(&n_dist);
    intrinsics.normalized_to_pixel(&n_undist)
}

/// Undistort a pixel to normalized coordinates on the `Z = 1` plane.
pub fn undistort_to_normalized<D: DistortionModel + ?Sized>(
    pixel: &Pt2,
    intrinsics: &PinholeIntrinsics,
    distortion: &D,
) -> Vec2 {
    distortion.undistort(&intrinsics.pixel_to_normalized(pixel))
}

/// Apply distortion to an ideal pixel. Approximate inverse of [`undistort_pixel`].
pub fn distort_pixel<D: DistortionModel + ?Sized>(
    pixel: &Pt2,
    intrinsics: &PinholeIntrinsics,
    distortion: &D,
) -> Pt2 {
    let n_undist = intrinsics.pixel_to_normalized(pixel);
    intrinsics.normalized_to_pixel(&distortion.distort(&n_undist))
}
