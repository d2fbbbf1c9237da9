use serde::{Deserialize, Serialize};

use crate::{Mat3, Pt2, Real, Vec2};

/// Standard pinhole intrinsics with optional skew.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinholeIntrinsics {
    /// Focal length in pixels along X.
    pub fx: Real,
    /// Focal length in pixels along Y.
    pub fy: Real,
    /// Principal point X coordinate in pixels.
    pub cx: Real,
    /// Principal point Y coordinate in pixels.
    pub cy: Real,
    /// Skew term (typically 0).
    #[serde(default)]
    pub skew: Real,
}

impl PinholeIntrinsics {
    /// Read intrinsics from an upper-triangular camera matrix `K`.
    ///
    /// Returns `None` when `K` is not of the form
    /// `[[fx, s, cx], [0, fy, cy], [0, 0, 1]]` with finite, non-zero focal lengths.
    pub fn from_matrix(k: &Mat3) -> Option<Self> {
        if k.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let lower_ok = k[(1, 0)] == 0.0 && k[(2, 0)] == 0.0 && k[(2, 1)] == 0.0;
        if !lower_ok || (k[(2, 2)] - 1.0).abs() > 1e-9 {
            return None;
        }
        if k[(0, 0)].abs() <= Real::EPSILON || k[(1, 1)].abs() <= Real::EPSILON {
            return None;
        }
        Some(Self {
            fx: k[(0, 0)],
            fy: k[(1, 1)],
            cx: k[(0, 2)],
            cy: k[(1, 2)],
            skew: k[(0, 1)],
        })
    }

    /// Return the 3x3 camera intrinsics matrix K.
    pub fn k_matrix(&self) -> Mat3 {
        Mat3::new(
            self.fx, self.skew, self.cx, 0.0, self.fy, self.cy, 0.0, 0.0, 1.0,
        )
    }

    /// Principal point in pixels.
    pub fn principal_point(&self) -> Pt2 {
        Pt2::new(self.cx, self.cy)
    }

    /// Apply `K⁻¹`: pixel to the normalized image plane.
    pub fn pixel_to_normalized(&self, pixel: &Pt2) -> Vec2 {
        let y = (pixel.y - self.cy) / self.fy;
        let x = (pixel.x - self.cx - self.skew * y) / self.fx;
        Vec2::new(x, y)
    }

    /// Apply `K`: normalized image plane to pixel.
    pub fn normalized_to_pixel(&self, n: &Vec2) -> Pt2 {
        Pt2::new(
            self.fx * n.x + self.skew * n.y + self.cx,
            self.fy * n.y + self.cy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_roundtrip() {
        let k = PinholeIntrinsics {
            fx: 890.0,
            fy: 885.0,
            cx: 800.0,
            cy: 600.0,
            skew: 0.5,
        };
        assert_eq!(PinholeIntrinsics::from_matrix(&k.k_matrix()), Some(k));
    }

    #[test]
    fn rejects_non_camera_matrices() {
        let mut m = Mat3::identity();
        m[(0, 0)] = 0.0;
        assert!(PinholeIntrinsics::from_matrix(&m).is_none());

        let mut m = Mat3::identity();
        m[(2, 0)] = 0.1;
        assert!(PinholeIntrinsics::from_matrix(&m).is_none());
    }

    #[test]
    fn pixel_normalized_roundtrip() {
        let k = PinholeIntrinsics {
            fx: 800.0,
            fy: 780.0,
            cx: 640.0,
            cy: 360.0,
            skew: 1.5,
        };
        let px = Pt2::new(700.0, 400.0);
        let back = k.normalized_to_pixel(&k.pixel_to_normalized(&px));
        assert!((back - px).norm() < 1e-10);
    }
}
