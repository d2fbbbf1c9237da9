//! Dwell-time fixation detection.
//!
//! A [`FixationDetector`] watches one region: the cursor must stay inside it
//! continuously for the dwell threshold. Leaving the region at any point
//! discards the elapsed time; there is no partial credit.
//!
//! Two users are provided on top of the detector:
//!
//! - [`FixationBoard`]: selectable targets, removed once their dwell completes.
//! - [`AimTracker`]: a short dwell on the free-floating cursor that gates a
//!   visual affordance and never removes anything.

mod aim;
mod board;
mod detector;

pub use aim::AimTracker;
pub use board::{FixationBoard, TargetId};
pub use detector::{CompletionPolicy, FixationDetector, FixationEvent, FixationState};
