use serde::{Deserialize, Serialize};

use crate::{Real, Vec2};

const DEFAULT_UNDISTORT_ITERS: u32 = 8;

/// Lens distortion acting on normalized image coordinates (the `Z = 1` plane).
pub trait DistortionModel {
    /// Apply distortion to an ideal normalized coordinate.
    fn distort(&self, n_undist: &Vec2) -> Vec2;
    /// Remove distortion from an observed normalized coordinate.
    fn undistort(&self, n_dist: &Vec2) -> Vec2;
}

/// Identity model for already rectified cameras.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NoDistortion;

impl DistortionModel for NoDistortion {
    fn distort(&self, n_undist: &Vec2) -> Vec2 {
        *n_undist
    }

    fn undistort(&self, n_dist: &Vec2) -> Vec2 {
        *n_dist
    }
}

/// Radial (k1, k2, k3) plus tangential (p1, p2) Brown-Conrady model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrownConrady5 {
    pub k1: Real,
    pub k2: Real,
    pub k3: Real,
    pub p1: Real,
    pub p2: Real,
    /// Fixed-point iterations used by [`DistortionModel::undistort`]; `0` means default.
    #[serde(default)]
    pub iters: u32,
}

impl BrownConrady5 {
    fn radial(&self, r2: Real) -> Real {
        1.0 + ((self.k3 * r2 + self.k2) * r2 + self.k1) * r2
    }
}

impl DistortionModel for BrownConrady5 {
    fn distort(&self, n_undist: &Vec2) -> Vec2 {
        let r2 = n_undist.norm_squared();
        *n_undist * self.radial(r2) + tangential(self.p1, self.p2, n_undist)
    }

    fn undistort(&self, n_dist: &Vec2) -> Vec2 {
        invert(n_dist, self.iters, |n| {
            let r2 = n.norm_squared();
            (1.0 / self.radial(r2), tangential(self.p1, self.p2, n))
        })
    }
}

/// Eight-coefficient rational model (`k1..k6`, `p1`, `p2`).
///
/// The radial term is `(1 + k1 r² + k2 r⁴ + k3 r⁶) / (1 + k4 r² + k5 r⁴ + k6 r⁶)`.
/// Head-mounted scene cameras are commonly shipped with this model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RationalPolynomial8 {
    pub k1: Real,
    pub k2: Real,
    pub k3: Real,
    pub k4: Real,
    pub k5: Real,
    pub k6: Real,
    pub p1: Real,
    pub p2: Real,
    #[serde(default)]
    pub iters: u32,
}

impl RationalPolynomial8 {
    fn numerator(&self, r2: Real) -> Real {
        1.0 + ((self.k3 * r2 + self.k2) * r2 + self.k1) * r2
    }

    fn denominator(&self, r2: Real) -> Real {
        1.0 + ((self.k6 * r2 + self.k5) * r2 + self.k4) * r2
    }
}

impl DistortionModel for RationalPolynomial8 {
    fn distort(&self, n_undist: &Vec2) -> Vec2 {
        let r2 = n_undist.norm_squared();
        let radial = self.numerator(r2) / self.denominator(r2);
        *n_undist * radial + tangential(self.p1, self.p2, n_undist)
    }

    fn undistort(&self, n_dist: &Vec2) -> Vec2 {
        invert(n_dist, self.iters, |n| {
            let r2 = n.norm_squared();
            (
                self.denominator(r2) / self.numerator(r2),
                tangential(self.p1, self.p2, n),
            )
        })
    }
}

/// Distortion selected at load time from an OpenCV coefficient vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnyDistortion {
    #[default]
    None,
    BrownConrady5(BrownConrady5),
    RationalPolynomial8(RationalPolynomial8),
}

impl AnyDistortion {
    /// Build a model from coefficients in OpenCV order `k1, k2, p1, p2[, k3[, k4, k5, k6]]`.
    ///
    /// Accepts 0, 4, 5 or 8 coefficients; any other length returns `None`.
    pub fn from_opencv_coeffs(c: &[Real]) -> Option<Self> {
        match c.len() {
            0 => Some(Self::None),
            4 | 5 => Some(Self::BrownConrady5(BrownConrady5 {
                k1: c[0],
                k2: c[1],
                p1: c[2],
                p2: c[3],
                k3: c.get(4).copied().unwrap_or(0.0),
                iters: DEFAULT_UNDISTORT_ITERS,
            })),
            8 => Some(Self::RationalPolynomial8(RationalPolynomial8 {
                k1: c[0],
                k2: c[1],
                p1: c[2],
                p2: c[3],
                k3: c[4],
                k4: c[5],
                k5: c[6],
                k6: c[7],
                iters: DEFAULT_UNDISTORT_ITERS,
            })),
            _ => None,
        }
    }

    /// True when every coefficient is zero (or there is no model at all).
    pub fn is_identity(&self) -> bool {
        match self {
            Self::None => true,
            Self::BrownConrady5(d) => [d.k1, d.k2, d.k3, d.p1, d.p2].iter().all(|c| *c == 0.0),
            Self::RationalPolynomial8(d) => [d.k1, d.k2, d.k3, d.k4, d.k5, d.k6, d.p1, d.p2]
                .iter()
                .all(|c| *c == 0.0),
        }
    }
}

impl DistortionModel for AnyDistortion {
    fn distort(&self, n_undist: &Vec2) -> Vec2 {
        match self {
            Self::None => NoDistortion.distort(n_undist),
            Self::BrownConrady5(d) => d.distort(n_undist),
            Self::RationalPolynomial8(d) => d.distort(n_undist),
        }
    }

    fn undistort(&self, n_dist: &Vec2) -> Vec2 {
        match self {
            Self::None => NoDistortion.undistort(n_dist),
            Self::BrownConrady5(d) => d.undistort(n_dist),
            Self::RationalPolynomial8(d) => d.undistort(n_dist),
        }
    }
}

fn tangential(p1: Real, p2: Real, n: &Vec2) -> Vec2 {
    let (x, y) = (n.x, n.y);
    let r2 = x * x + y * y;
    Vec2::new(
        2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x),
        p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y,
    )
}

/// Fixed-point inversion `x ← (x_d − δ(x)) · inv_radial(x)`, as in OpenCV's `undistortPoints`.
///
/// `step` returns the inverse radial factor and the tangential offset at `x`.
fn invert<F>(n_dist: &Vec2, iters: u32, step: F) -> Vec2
where
    F: Fn(&Vec2) -> (Real, Vec2),
{
    let iters = if iters == 0 {
        DEFAULT_UNDISTORT_ITERS
    } else {
        iters
    };
    let mut n = *n_dist;
    for _ in 0..iters {
        let (inv_radial, delta) = step(&n);
        n = (*n_dist - delta) * inv_radial;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bc5() -> BrownConrady5 {
        BrownConrady5 {
            k1: -0.28,
            k2: 0.07,
            k3: 0.0,
            p1: 0.001,
            p2: -0.0005,
            iters: 20,
        }
    }

    #[test]
    fn brown_conrady_inverts_forward_model() {
        let d = bc5();
        let n = Vec2::new(0.21, -0.14);
        let back = d.undistort(&d.distort(&n));
        assert!((back - n).norm() < 1e-9, "err={}", (back - n).norm());
    }

    #[test]
    fn rational_inverts_forward_model() {
        let d = RationalPolynomial8 {
            k1: 0.12,
            k2: -0.05,
            k3: 0.001,
            k4: 0.4,
            k5: -0.02,
            k6: 0.003,
            p1: 0.0004,
            p2: -0.0002,
            iters: 20,
        };
        let n = Vec2::new(-0.3, 0.25);
        let back = d.undistort(&d.distort(&n));
        assert!((back - n).norm() < 1e-9, "err={}", (back - n).norm());
    }

    #[test]
    fn origin_is_a_fixed_point() {
        let n = Vec2::zeros();
        assert_eq!(bc5().undistort(&n), n);
    }

    #[test]
    fn coefficient_vector_lengths() {
        assert_eq!(AnyDistortion::from_opencv_coeffs(&[]), Some(AnyDistortion::None));
        match AnyDistortion::from_opencv_coeffs(&[0.1, 0.2, 0.3, 0.4]) {
            Some(AnyDistortion::BrownConrady5(d)) => {
                assert_eq!(d.p1, 0.3);
                assert_eq!(d.k3, 0.0);
            }
            other => panic!("unexpected model {other:?}"),
        }
        match AnyDistortion::from_opencv_coeffs(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]) {
            Some(AnyDistortion::RationalPolynomial8(d)) => {
                assert_eq!(d.k3, 5.0);
                assert_eq!(d.k6, 8.0);
                assert_eq!(d.p2, 4.0);
            }
            other => panic!("unexpected model {other:?}"),
        }
        assert!(AnyDistortion::from_opencv_coeffs(&[0.0; 6]).is_none());
    }
}
