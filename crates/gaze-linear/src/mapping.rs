//! The fitted gaze-to-screen mapping.

use gaze_core::{
    from_homogeneous, mat3_from_rows, mat3_to_rows, to_homogeneous, Mat3, Pt2, Real,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    check_configuration, check_matrix, dlt_homography, fit_affine, FitError, PointSet,
    AFFINE_MIN_PAIRS, HOMOGRAPHY_MIN_PAIRS,
};

/// One correspondence between an undistorted gaze point and its screen destination.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointPair {
    pub gaze: Pt2,
    pub screen: Pt2,
}

impl PointPair {
    pub fn new(gaze: Pt2, screen: Pt2) -> Self {
        Self { gaze, screen }
    }
}

/// Family of transforms the fitter estimates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    /// Full 8-DOF homography. Needs at least 4 pairs.
    #[default]
    Projective,
    /// 6-DOF affine transform. Needs at least 3 pairs.
    Affine,
}

impl MappingKind {
    pub fn min_pairs(self) -> usize {
        match self {
            MappingKind::Projective => HOMOGRAPHY_MIN_PAIRS,
            MappingKind::Affine => AFFINE_MIN_PAIRS,
        }
    }
}

/// Immutable 3×3 transform from gaze space to screen space.
///
/// A new `Mapping` is produced by every fit; it is never updated in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "MappingRepr", into = "MappingRepr")]
pub struct Mapping {
    kind: MappingKind,
    matrix: Mat3,
}

#[derive(Clone, Serialize, Deserialize)]
struct MappingRepr {
    kind: MappingKind,
    matrix: [[Real; 3]; 3],
}

impl From<MappingRepr> for Mapping {
    fn from(r: MappingRepr) -> Self {
        Self {
            kind: r.kind,
            matrix: mat3_from_rows(&r.matrix),
        }
    }
}

impl From<Mapping> for MappingRepr {
    fn from(m: Mapping) -> Self {
        Self {
            kind: m.kind,
            matrix: mat3_to_rows(&m.matrix),
        }
    }
}

impl Mapping {
    /// Wrap an existing matrix without validation.
    pub fn from_matrix(kind: MappingKind, matrix: Mat3) -> Self {
        Self { kind, matrix }
    }

    /// Fit a mapping to the given pairs, replacing nothing: each call is a full refit.
    ///
    /// # Errors
    ///
    /// - [`FitError::NotEnoughData`] below [`MappingKind::min_pairs`].
    /// - [`FitError::NonFiniteInput`] for NaN or infinite coordinates.
    /// - [`FitError::Degenerate`] for coincident or collinear points on either
    ///   side, or when the solved matrix is singular.
    pub fn fit(pairs: &[PointPair], kind: MappingKind) -> Result<Self, FitError> {
        let needed = kind.min_pairs();
        if pairs.len() < needed {
            return Err(FitError::NotEnoughData {
                needed,
                got: pairs.len(),
            });
        }
        if let Some(index) = pairs.iter().position(|p| {
            !(p.gaze.x.is_finite()
                && p.gaze.y.is_finite()
                && p.screen.x.is_finite()
                && p.screen.y.is_finite())
        }) {
            return Err(FitError::NonFiniteInput { index });
        }

        let gaze: Vec<Pt2> = pairs.iter().map(|p| p.gaze).collect();
        let screen: Vec<Pt2> = pairs.iter().map(|p| p.screen).collect();
        check_configuration(&gaze, needed, PointSet::Gaze)?;
        check_configuration(&screen, needed, PointSet::Screen)?;

        let matrix = match kind {
            MappingKind::Projective => dlt_homography(&gaze, &screen)?,
            MappingKind::Affine => fit_affine(&gaze, &screen)?,
        };
        check_matrix(&matrix)?;

        let mapping = Self { kind, matrix };
        debug!(
            "fitted {:?} mapping from {} pairs, rms={:.3}px",
            kind,
            pairs.len(),
            mapping.rms_error(pairs)
        );
        Ok(mapping)
    }

    pub fn kind(&self) -> MappingKind {
        self.kind
    }

    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    /// Map a gaze point to screen space.
    ///
    /// Returns `None` when the point lands on the line at infinity.
    pub fn apply(&self, gaze: &Pt2) -> Option<Pt2> {
        from_homogeneous(&(self.matrix * to_homogeneous(gaze)))
    }

    /// Per-pair Euclidean reprojection error in screen pixels.
    ///
    /// Pairs that map to infinity report `Real::INFINITY`.
    pub fn residuals(&self, pairs: &[PointPair]) -> Vec<Real> {
        pairs
            .iter()
            .map(|p| {
                self.apply(&p.gaze)
                    .map_or(Real::INFINITY, |m| (m - p.screen).norm())
            })
            .collect()
    }

    /// Root-mean-square of [`Mapping::residuals`]; `0.0` for no pairs.
    pub fn rms_error(&self, pairs: &[PointPair]) -> Real {
        if pairs.is_empty() {
            return 0.0;
        }
        let sum_sq: Real = self.residuals(pairs).iter().map(|r| r * r).sum();
        (sum_sq / pairs.len() as Real).sqrt()
    }
}
