//! Session and fixation configuration.
//!
//! Every struct deserializes with field-level defaults, so a config file only
//! needs to name what it changes:
//!
//! ```json
//! { "session": { "capture": { "samples_per_point": 60 } },
//!   "fixation": { "target_dwell_ms": 1500 } }
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use gaze_core::{Pt2, Real, ScreenBounds};
use gaze_linear::MappingKind;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::session::NudgeMagnitude;

/// Burst capture settings for one calibration target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Number of samples polled per burst.
    pub samples_per_point: usize,
    /// Pause between consecutive polls.
    pub sample_interval_ms: u64,
    /// Fraction of the burst that must be valid for the capture to succeed.
    pub min_valid_fraction: Real,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            samples_per_point: 30,
            sample_interval_ms: 10,
            min_valid_fraction: 0.7,
        }
    }
}

impl CaptureOptions {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Minimum number of valid samples for a successful burst (at least 1).
    pub fn required_valid(&self) -> usize {
        let fraction = self.min_valid_fraction.clamp(0.0, 1.0);
        let required = (fraction * self.samples_per_point as Real - 1e-9).ceil();
        (required.max(0.0) as usize).max(1)
    }
}

/// Device settling period before the first capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmupOptions {
    pub samples: usize,
    pub interval_ms: u64,
}

impl Default for WarmupOptions {
    fn default() -> Self {
        Self {
            samples: 30,
            interval_ms: 10,
        }
    }
}

impl WarmupOptions {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Step sizes for manual point adjustment, in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NudgeOptions {
    pub small_px: Real,
    pub large_px: Real,
}

impl Default for NudgeOptions {
    fn default() -> Self {
        Self {
            small_px: 1.0,
            large_px: 10.0,
        }
    }
}

impl NudgeOptions {
    pub fn step(&self, magnitude: NudgeMagnitude) -> Real {
        match magnitude {
            NudgeMagnitude::Small => self.small_px,
            NudgeMagnitude::Large => self.large_px,
        }
    }
}

/// Where calibration targets are placed on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetLayout {
    /// Screen center, then top-left, top-right, bottom-left, bottom-right
    /// corners inset by `margin` pixels.
    CenterAndCorners { margin: Real },
    /// Explicit target list in screen pixels.
    Explicit { points: Vec<[Real; 2]> },
}

impl Default for TargetLayout {
    fn default() -> Self {
        TargetLayout::CenterAndCorners { margin: 100.0 }
    }
}

impl TargetLayout {
    pub fn targets(&self, screen: &ScreenBounds) -> Vec<Pt2> {
        match self {
            TargetLayout::CenterAndCorners { margin } => {
                let (w, h, m) = (screen.width, screen.height, *margin);
                vec![
                    Pt2::new((w / 2.0).floor(), (h / 2.0).floor()),
                    Pt2::new(m, m),
                    Pt2::new(w - m, m),
                    Pt2::new(m, h - m),
                    Pt2::new(w - m, h - m),
                ]
            }
            TargetLayout::Explicit { points } => {
                points.iter().map(|[x, y]| Pt2::new(*x, *y)).collect()
            }
        }
    }
}

/// Calibration session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub screen: ScreenBounds,
    pub targets: TargetLayout,
    pub capture: CaptureOptions,
    pub warmup: WarmupOptions,
    pub nudge: NudgeOptions,
    pub mapping_kind: MappingKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            screen: ScreenBounds::new(1920.0, 1080.0),
            targets: TargetLayout::default(),
            capture: CaptureOptions::default(),
            warmup: WarmupOptions::default(),
            nudge: NudgeOptions::default(),
            mapping_kind: MappingKind::Projective,
        }
    }
}

impl SessionConfig {
    pub fn target_points(&self) -> Vec<Pt2> {
        self.targets.targets(&self.screen)
    }
}

/// Dwell thresholds for target selection and the aim affordance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixationConfig {
    pub target_dwell_ms: u64,
    pub aim_dwell_ms: u64,
    pub aim_radius_px: Real,
}

impl Default for FixationConfig {
    fn default() -> Self {
        Self {
            target_dwell_ms: 1000,
            aim_dwell_ms: 20,
            aim_radius_px: 40.0,
        }
    }
}

impl FixationConfig {
    pub fn target_dwell(&self) -> Duration {
        Duration::from_millis(self.target_dwell_ms)
    }

    pub fn aim_dwell(&self) -> Duration {
        Duration::from_millis(self.aim_dwell_ms)
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    pub session: SessionConfig,
    pub fixation: FixationConfig,
}

impl GazeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid gaze config JSON")
    }

    /// Load a config file; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in {}", path.display()))
    }
}
