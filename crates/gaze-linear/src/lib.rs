//! Linear estimation of the gaze-to-screen mapping.
//!
//! The solvers in this crate are closed-form: a normalized DLT for the
//! projective case and a normalized least-squares fit for the affine case.
//! Both share Hartley conditioning and an explicit degeneracy check so that a
//! bad point configuration surfaces as a typed [`FitError`] instead of a
//! numerically meaningless matrix.
//!
//! Most callers only need [`Mapping::fit`] and [`Mapping::apply`]:
//!
//! ```
//! use gaze_core::Pt2;
//! use gaze_linear::{Mapping, MappingKind, PointPair};
//!
//! let pairs: Vec<PointPair> = [(100.0, 100.0), (1820.0, 100.0), (1820.0, 980.0), (100.0, 980.0)]
//!     .iter()
//!     .map(|&(x, y)| PointPair::new(Pt2::new(x - 50.0, y - 50.0), Pt2::new(x, y)))
//!     .collect();
//!
//! let mapping = Mapping::fit(&pairs, MappingKind::Projective).unwrap();
//! let cursor = mapping.apply(&Pt2::new(200.0, 200.0)).unwrap();
//! assert!((cursor.x - 250.0).abs() < 1e-6);
//! ```

mod affine;
mod degeneracy;
mod error;
mod homography;
mod mapping;
pub mod math;

pub use affine::*;
pub use degeneracy::*;
pub use error::*;
pub use homography::*;
pub use mapping::*;
