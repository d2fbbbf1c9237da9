//! Calibration artifact: a flat JSON list of captured points.
//!
//! ```json
//! [
//!   { "gaze": [812.4, 603.9], "screen": [960.0, 540.0], "adjusted": null },
//!   { "gaze": [402.1, 288.0], "screen": [100.0, 100.0], "adjusted": [104.0, 97.0] }
//! ]
//! ```
//!
//! The mapping itself is never stored; consumers refit it with [`fit_artifact`].

use std::fs;
use std::path::Path;

use gaze_core::{Pt2, Real};
use gaze_linear::{FitError, Mapping, MappingKind, PointPair};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to access calibration file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed calibration file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One populated calibration target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// Aggregated undistorted gaze point.
    pub gaze: [Real; 2],
    /// Fixed on-screen target position.
    pub screen: [Real; 2],
    /// Operator correction; replaces `screen` as the fit destination.
    #[serde(default)]
    pub adjusted: Option<[Real; 2]>,
}

impl CalibrationRecord {
    pub fn new(gaze: Pt2, screen: Pt2, adjusted: Option<Pt2>) -> Self {
        Self {
            gaze: [gaze.x, gaze.y],
            screen: [screen.x, screen.y],
            adjusted: adjusted.map(|p| [p.x, p.y]),
        }
    }

    /// Fit destination: `adjusted` when present, else `screen`.
    pub fn destination(&self) -> Pt2 {
        let [x, y] = self.adjusted.unwrap_or(self.screen);
        Pt2::new(x, y)
    }

    pub fn to_pair(&self) -> PointPair {
        PointPair::new(Pt2::new(self.gaze[0], self.gaze[1]), self.destination())
    }
}

/// Write the records, replacing any existing file.
pub fn save_artifact(
    path: impl AsRef<Path>,
    records: &[CalibrationRecord],
) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(records).map_err(|source| ArtifactError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!("saved {} calibration points to {}", records.len(), path.display());
    Ok(())
}

pub fn load_artifact(path: impl AsRef<Path>) -> Result<Vec<CalibrationRecord>, ArtifactError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ArtifactError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Like [`load_artifact`], but a missing or corrupt file means "not calibrated yet".
pub fn load_artifact_or_empty(path: impl AsRef<Path>) -> Vec<CalibrationRecord> {
    match load_artifact(&path) {
        Ok(records) => records,
        Err(err) => {
            warn!("{err}; continuing without calibration");
            Vec::new()
        }
    }
}

/// Rebuild the mapping from persisted records.
pub fn fit_artifact(records: &[CalibrationRecord], kind: MappingKind) -> Result<Mapping, FitError> {
    let pairs: Vec<PointPair> = records.iter().map(CalibrationRecord::to_pair).collect();
    Mapping::fit(&pairs, kind)
}
