//! High-level entry crate for gaze calibration and dwell selection.
//!
//! A head-mounted eye tracker reports gaze in the pixel space of its scene
//! camera. This crate turns that into a screen cursor:
//! - undistort raw gaze with the scene camera intrinsics,
//! - calibrate a gaze-to-screen mapping from a handful of fixated targets,
//! - resolve a clamped cursor every frame, falling back to the pointer when
//!   no usable gaze sample is available,
//! - select on-screen targets by dwelling on them.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use gaze::prelude::*;
//!
//! let camera = Arc::new(CameraIntrinsics::load("scene_camera.json")?);
//! let config = GazeConfig::load("gaze.json")?;
//!
//! // Calibration: warm up, then confirm each target while the user looks at it.
//! # let source = NoSource;
//! let mut session = CalibrationSession::new(config.session.clone(), camera, source, SystemClock);
//! session.start();
//! while session.current_target().is_some() {
//!     session.handle(SessionCommand::Confirm)?;
//! }
//! save_artifact("calibration.json", &session.finish())?;
//!
//! // Runtime: one cursor per frame.
//! let cursor = load_cursor("scene_camera.json", "calibration.json", &config.session)?;
//! # let mut source = NoSource;
//! let sample = cursor.resolve(&mut source, || Pt2::new(0.0, 0.0));
//! # let _ = sample;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`core`] - Math aliases, scene camera model, undistortion, screen geometry
//! - [`linear`] - Homography and affine mapping fits with degeneracy checks
//! - [`session`] - Operator-driven calibration state machine
//! - [`runtime`] - Cursor resolution, clocks and gaze sources
//! - [`fixation`] - Dwell detectors for targets and the aim cursor
//! - [`synthetic`] - Deterministic simulated gaze sources

// ═══════════════════════════════════════════════════════════════════════════════
// Calibration
// ═══════════════════════════════════════════════════════════════════════════════

/// Calibration session state machine and its artifact.
///
/// # Flow
/// 1. `start` - drain the device warmup window
/// 2. `Confirm` per target - paced burst capture, refit after every point
/// 3. Replay - `Redo`, `ManualEdit` + `Nudge` + `ConfirmEdit`, `SelectTarget`
/// 4. `Quit` - `finish` returns the populated records for [`save_artifact`]
pub mod session {
    pub use gaze_pipeline::session::{
        CalibrationPoint, CalibrationSession, Direction, LogEntry, NudgeMagnitude, Phase,
        ReplayRow, SessionCommand, SessionError, SessionEvent,
    };
    pub use gaze_pipeline::{
        capture_burst, drain_warmup, is_live, BurstCapture, CaptureError, CaptureOptions,
        NudgeOptions, SessionConfig, TargetLayout, WarmupOptions,
    };
}

/// Per-frame cursor resolution.
pub mod runtime {
    pub use gaze_pipeline::{
        load_cursor, Clock, CursorOrigin, CursorSample, GazeCursor, GazeSample, GazeSource,
        ManualClock, NoSource, SystemClock,
    };
}

/// Dwell-time selection.
pub mod fixation {
    pub use gaze_pipeline::fixation::*;
    pub use gaze_pipeline::FixationConfig;
}

/// Simulated gaze sources for tests and demos.
pub mod synthetic {
    pub use gaze_pipeline::synthetic::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Foundation Crates
// ═══════════════════════════════════════════════════════════════════════════════

/// Math types, scene camera model and screen geometry.
pub mod core {
    pub use gaze_core::*;
}

/// Closed-form gaze-to-screen mapping fits.
pub mod linear {
    pub use gaze_linear::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Root Re-exports
// ═══════════════════════════════════════════════════════════════════════════════

pub use gaze_core::{CameraIntrinsics, Pt2, Real, Region, ScreenBounds, Vec2};
pub use gaze_linear::{FitError, Mapping, MappingKind, PointPair};
pub use gaze_pipeline::{
    fit_artifact, load_artifact, load_artifact_or_empty, save_artifact, ArtifactError,
    CalibrationRecord, CalibrationSession, GazeConfig, GazeCursor,
};

/// Prelude module for convenient imports.
///
/// ```no_run
/// use gaze::prelude::*;
/// ```
pub mod prelude {
    // Session
    pub use crate::session::{CalibrationSession, Phase, SessionCommand, SessionEvent};

    // Artifact
    pub use crate::{load_artifact, save_artifact, CalibrationRecord};

    // Runtime
    pub use crate::runtime::{
        load_cursor, Clock, CursorOrigin, GazeCursor, GazeSample, GazeSource, NoSource,
        SystemClock,
    };
    pub use crate::fixation::{AimTracker, FixationBoard, FixationEvent};

    // Core types
    pub use crate::{
        CameraIntrinsics, GazeConfig, Mapping, MappingKind, PointPair, Pt2, Real, Region,
        ScreenBounds, Vec2,
    };
}
