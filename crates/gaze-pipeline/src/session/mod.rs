//! Operator-driven calibration session.
//!
//! ```text
//! Warmup -> Capture(0) -> ... -> Capture(n-1) -> Replay
//! Replay -> Capture(i, redo) -> Replay
//! Replay -> ManualEdit(i) -> Replay        (confirm_edit or cancel)
//! any    -> Done                           (quit)
//! ```
//!
//! The populated points are a valid output whichever phase the session
//! ends in.

mod machine;
mod types;

pub use machine::CalibrationSession;
pub use types::*;
