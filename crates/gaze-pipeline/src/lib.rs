//! Calibration session, runtime cursor and dwell selection.
//!
//! The crate is split along the data flow of a gaze-driven application:
//!
//! - [`aggregator`]: paced burst capture of one calibration target.
//! - [`session`]: the operator-driven calibration state machine.
//! - [`artifact`]: the flat JSON list of calibration points.
//! - [`cursor`]: per-frame raw sample to screen cursor resolution.
//! - [`fixation`]: dwell-time detection for targets and the aim cursor.
//!
//! ```no_run
//! use gaze_pipeline::{load_cursor, GazeConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = GazeConfig::load("gaze.json")?;
//! let cursor = load_cursor("scene_camera.json", "calibration.json", &config.session)?;
//! # let _ = cursor;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod artifact;
pub mod clock;
pub mod config;
pub mod cursor;
pub mod fixation;
pub mod session;
pub mod source;
pub mod synthetic;

pub use aggregator::{capture_burst, drain_warmup, is_live, BurstCapture, CaptureError};
pub use artifact::{
    fit_artifact, load_artifact, load_artifact_or_empty, save_artifact, ArtifactError,
    CalibrationRecord,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CaptureOptions, FixationConfig, GazeConfig, NudgeOptions, SessionConfig, TargetLayout,
    WarmupOptions,
};
pub use cursor::{load_cursor, CursorOrigin, CursorSample, GazeCursor};
pub use fixation::{
    AimTracker, CompletionPolicy, FixationBoard, FixationDetector, FixationEvent, FixationState,
    TargetId,
};
pub use session::{
    CalibrationPoint, CalibrationSession, Direction, LogEntry, NudgeMagnitude, Phase, ReplayRow,
    SessionCommand, SessionError, SessionEvent,
};
pub use source::{GazeSample, GazeSource, NoSource};
pub use synthetic::{ScriptedGazeSource, SplitMix64, SyntheticGazeSource};
