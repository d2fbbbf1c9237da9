//! Value types exchanged with the calibration session.

use std::time::SystemTime;

use gaze_core::{Pt2, Real, Vec2};
use gaze_linear::FitError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::CalibrationRecord;

/// One calibration target slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    pub screen_target: Pt2,
    /// Aggregated undistorted gaze; `None` until captured.
    pub gaze: Option<Pt2>,
    /// Manual correction of the fit destination.
    pub adjusted: Option<Pt2>,
}

impl CalibrationPoint {
    pub fn empty(screen_target: Pt2) -> Self {
        Self {
            screen_target,
            gaze: None,
            adjusted: None,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.gaze.is_some()
    }

    /// `adjusted` if set, else the target position.
    pub fn destination(&self) -> Pt2 {
        self.adjusted.unwrap_or(self.screen_target)
    }

    pub fn clear(&mut self) {
        self.gaze = None;
        self.adjusted = None;
    }

    pub fn to_record(&self) -> Option<CalibrationRecord> {
        self.gaze
            .map(|gaze| CalibrationRecord::new(gaze, self.screen_target, self.adjusted))
    }
}

/// Session phase. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Device settling; left on the first `Confirm` or `start()`.
    Warmup,
    /// Waiting for `Confirm` to capture target `index`.
    Capture { index: usize, redo: bool },
    /// All targets captured; operator reviews the fit.
    Replay,
    /// Operator is moving the destination of target `index`.
    ManualEdit { index: usize, pending: Pt2 },
    /// Terminal.
    Done,
}

/// Screen-space nudge direction (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeMagnitude {
    Small,
    Large,
}

/// Discrete operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Confirm,
    SelectTarget(usize),
    Redo(usize),
    ManualEdit(usize),
    Nudge {
        direction: Direction,
        magnitude: NudgeMagnitude,
    },
    ConfirmEdit,
    Cancel,
    Quit,
}

/// What a command did, for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    WarmupComplete { delivered: usize },
    Captured { index: usize, gaze: Pt2, valid: usize, total: usize },
    CaptureFailed { index: usize, valid: usize, required: usize },
    MappingUpdated { pairs: usize, rms_error: Real },
    MappingCleared { pairs: usize, reason: FitError },
    PhaseChanged(Phase),
    TargetSelected(usize),
    Nudged { index: usize, position: Pt2 },
    EditCommitted { index: usize, adjusted: Pt2 },
    EditCancelled { index: usize },
    /// The command has no effect in the current phase.
    Ignored(SessionCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("target index {index} out of range (session has {count} targets)")]
    TargetOutOfRange { index: usize, count: usize },
}

/// Per-target row for rendering the replay view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayRow {
    pub index: usize,
    pub screen_target: Pt2,
    /// Mapped gaze, or the captured destination when no mapping exists.
    pub estimate: Option<Pt2>,
    pub adjusted: Option<Pt2>,
    /// Distance from `estimate` to the fit destination, when mapped.
    pub residual: Option<Real>,
}

/// Lightweight operation log entry.
///
/// Audit trail of what happened during a session; not used for replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unix timestamp of the operation (seconds since epoch).
    pub timestamp: u64,
    /// Operation name (e.g. "capture", "refit", "manual_edit").
    pub operation: String,
    pub success: bool,
    pub notes: Option<String>,
}

impl LogEntry {
    pub fn success(operation: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            success: true,
            notes: None,
        }
    }

    pub fn success_with_notes(operation: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::success(operation)
        }
    }

    pub fn failure(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            notes: Some(error.into()),
            ..Self::success(operation)
        }
    }
}

/// Current Unix timestamp in seconds (0 if the system clock is before the epoch).
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_constructors() {
        let ok = LogEntry::success_with_notes("refit", "rms=0.4px");
        assert!(ok.success);
        assert_eq!(ok.notes.as_deref(), Some("rms=0.4px"));
        assert!(ok.timestamp > 0);

        let failed = LogEntry::failure("capture", "only 3 of 30 samples were valid");
        assert!(!failed.success);
        assert_eq!(failed.operation, "capture");
    }

    #[test]
    fn destination_prefers_adjusted() {
        let mut p = CalibrationPoint::empty(Pt2::new(100.0, 100.0));
        assert_eq!(p.destination(), Pt2::new(100.0, 100.0));
        assert!(p.to_record().is_none());

        p.gaze = Some(Pt2::new(1.0, 2.0));
        p.adjusted = Some(Pt2::new(103.0, 99.0));
        assert_eq!(p.destination(), Pt2::new(103.0, 99.0));
        assert_eq!(p.to_record().map(|r| r.adjusted), Some(Some([103.0, 99.0])));

        p.clear();
        assert!(!p.is_captured());
        assert!(p.adjusted.is_none());
    }
}
