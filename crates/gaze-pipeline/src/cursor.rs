//! Runtime cursor: raw gaze sample to clamped screen position, once per frame.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use gaze_core::{CameraIntrinsics, Pt2, ScreenBounds};
use gaze_linear::Mapping;
use log::{debug, info, warn};

use crate::artifact::{fit_artifact, load_artifact_or_empty};
use crate::config::SessionConfig;
use crate::GazeSource;

/// How the cursor position of a frame was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOrigin {
    /// Undistorted gaze passed through the fitted mapping.
    Mapped,
    /// Undistorted gaze used as-is (no mapping available).
    Unmapped,
    /// No usable sample this frame; the fallback pointer was used.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSample {
    pub position: Pt2,
    pub origin: CursorOrigin,
}

/// Per-frame gaze cursor.
///
/// The mapping is held as `Option<Arc<Mapping>>` and can be swapped between
/// frames with [`GazeCursor::set_mapping`]; a frame always sees either a
/// complete mapping or none.
#[derive(Debug, Clone)]
pub struct GazeCursor {
    camera: Arc<CameraIntrinsics>,
    mapping: Option<Arc<Mapping>>,
    bounds: ScreenBounds,
}

impl GazeCursor {
    pub fn new(camera: Arc<CameraIntrinsics>, bounds: ScreenBounds) -> Self {
        Self {
            camera,
            mapping: None,
            bounds,
        }
    }

    pub fn with_mapping(mut self, mapping: Option<Arc<Mapping>>) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn set_mapping(&mut self, mapping: Option<Arc<Mapping>>) {
        self.mapping = mapping;
    }

    pub fn mapping(&self) -> Option<&Arc<Mapping>> {
        self.mapping.as_ref()
    }

    pub fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    /// Resolve this frame's cursor.
    ///
    /// Polls `source` once. An absent or non-live sample, or one the mapping
    /// sends to infinity, yields `fallback()` exactly as given. Gaze-derived
    /// positions are clamped to the screen.
    pub fn resolve<S, F>(&self, source: &mut S, fallback: F) -> CursorSample
    where
        S: GazeSource + ?Sized,
        F: FnOnce() -> Pt2,
    {
        let mapped = source
            .poll_sample()
            .filter(|s| s.valid)
            .and_then(|s| self.map_raw(&s.position));
        match mapped {
            Some(sample) => sample,
            None => CursorSample {
                position: fallback(),
                origin: CursorOrigin::Fallback,
            },
        }
    }

    /// Undistort, map (if calibrated) and clamp a raw scene-camera pixel.
    pub fn map_raw(&self, raw: &Pt2) -> Option<CursorSample> {
        let gaze = self.camera.undistort(raw);
        let (position, origin) = match &self.mapping {
            Some(mapping) => (mapping.apply(&gaze)?, CursorOrigin::Mapped),
            None => (gaze, CursorOrigin::Unmapped),
        };
        Some(CursorSample {
            position: self.bounds.clamp(&position),
            origin,
        })
    }
}

/// Build a runtime cursor the way a downstream application starts up:
/// load intrinsics, load the calibration artifact, fit once.
///
/// A missing intrinsics file is fatal. A missing or unusable calibration
/// leaves the cursor unmapped.
pub fn load_cursor(
    intrinsics_path: impl AsRef<Path>,
    artifact_path: impl AsRef<Path>,
    config: &SessionConfig,
) -> Result<GazeCursor> {
    let intrinsics_path = intrinsics_path.as_ref();
    let camera = CameraIntrinsics::load(intrinsics_path).with_context(|| {
        format!(
            "failed to load scene camera intrinsics from {}",
            intrinsics_path.display()
        )
    })?;

    let records = load_artifact_or_empty(artifact_path);
    let mapping = if records.is_empty() {
        debug!("no calibration points, cursor runs unmapped");
        None
    } else {
        match fit_artifact(&records, config.mapping_kind) {
            Ok(mapping) => {
                info!("loaded calibration with {} points", records.len());
                Some(Arc::new(mapping))
            }
            Err(err) => {
                warn!("calibration unusable ({err}), cursor runs unmapped");
                None
            }
        }
    };

    Ok(GazeCursor::new(Arc::new(camera), config.screen).with_mapping(mapping))
}
