use std::fmt;

use thiserror::Error;

/// Which side of the correspondences a problem was found on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointSet {
    Gaze,
    Screen,
}

impl fmt::Display for PointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointSet::Gaze => f.write_str("gaze"),
            PointSet::Screen => f.write_str("screen"),
        }
    }
}

/// Reason a point configuration (or the fitted matrix) was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DegeneracyKind {
    #[error("all {0} points coincide")]
    Coincident(PointSet),
    #[error("{0} points are collinear")]
    Collinear(PointSet),
    #[error("{set} points {indices:?} are collinear in a minimal configuration")]
    CollinearTriple { set: PointSet, indices: [usize; 3] },
    #[error("no four {0} points are in general position")]
    NoGeneralPosition(PointSet),
    #[error("fitted matrix has non-finite entries")]
    NonFinite,
    #[error("fitted matrix is singular")]
    Singular,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("need at least {needed} point pairs, got {got}")]
    NotEnoughData { needed: usize, got: usize },
    #[error("source and destination point counts differ ({src} vs {dst})")]
    MismatchedLengths { src: usize, dst: usize },
    #[error("point pair {index} has non-finite coordinates")]
    NonFiniteInput { index: usize },
    #[error("degenerate point configuration: {0}")]
    Degenerate(DegeneracyKind),
    #[error("svd failed")]
    SvdFailed,
    #[error("normalization transform is not invertible")]
    NonInvertible,
}

impl From<DegeneracyKind> for FitError {
    fn from(kind: DegeneracyKind) -> Self {
        FitError::Degenerate(kind)
    }
}
