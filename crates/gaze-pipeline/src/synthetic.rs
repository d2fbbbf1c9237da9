//! Deterministic gaze sources for tests, demos and offline simulation.
//!
//! Noise comes from a SplitMix64 stream rather than `rand`, so a given seed
//! produces the same samples on every platform and version.

use std::collections::VecDeque;
use std::sync::Arc;

use gaze_core::{from_homogeneous, to_homogeneous, CameraIntrinsics, Mat3, Pt2, Real, Vec2};

use crate::{GazeSample, GazeSource};

/// Replays a fixed list of polls; `None` entries model frames without data.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGazeSource {
    polls: VecDeque<Option<GazeSample>>,
}

impl ScriptedGazeSource {
    pub fn new(polls: impl IntoIterator<Item = Option<GazeSample>>) -> Self {
        Self {
            polls: polls.into_iter().collect(),
        }
    }

    pub fn from_samples(samples: impl IntoIterator<Item = GazeSample>) -> Self {
        Self::new(samples.into_iter().map(Some))
    }

    pub fn push(&mut self, poll: Option<GazeSample>) {
        self.polls.push_back(poll);
    }

    pub fn remaining(&self) -> usize {
        self.polls.len()
    }
}

impl GazeSource for ScriptedGazeSource {
    fn poll_sample(&mut self) -> Option<GazeSample> {
        self.polls.pop_front().flatten()
    }
}

/// SplitMix64 pseudo-random stream.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)` from the top 53 bits.
    pub fn next_unit(&mut self) -> Real {
        (self.next_u64() >> 11) as Real * (1.0 / (1u64 << 53) as Real)
    }

    /// Uniform in `[-max_abs, max_abs)` per axis.
    pub fn jitter(&mut self, max_abs: Real) -> Vec2 {
        if max_abs == 0.0 {
            return Vec2::zeros();
        }
        let u = self.next_unit();
        let v = self.next_unit();
        Vec2::new((u - 0.5) * 2.0 * max_abs, (v - 0.5) * 2.0 * max_abs)
    }
}

/// Simulated head-mounted tracker looking at a screen.
///
/// `screen_to_gaze` maps screen pixels to ideal (undistorted) scene-camera
/// pixels; samples are then jittered and passed through the camera's forward
/// distortion so they look like raw device output.
#[derive(Debug, Clone)]
pub struct SyntheticGazeSource {
    camera: Arc<CameraIntrinsics>,
    screen_to_gaze: Mat3,
    look_at: Pt2,
    jitter_px: Real,
    dropout_every: Option<usize>,
    polls: usize,
    rng: SplitMix64,
}

impl SyntheticGazeSource {
    pub fn new(camera: Arc<CameraIntrinsics>, screen_to_gaze: Mat3, seed: u64) -> Self {
        Self {
            camera,
            screen_to_gaze,
            look_at: Pt2::origin(),
            jitter_px: 0.0,
            dropout_every: None,
            polls: 0,
            rng: SplitMix64::new(seed),
        }
    }

    /// Gaze space offset from screen space by `-offset` (gaze = screen − offset).
    pub fn translated(camera: Arc<CameraIntrinsics>, offset: Vec2, seed: u64) -> Self {
        let mut h = Mat3::identity();
        h[(0, 2)] = -offset.x;
        h[(1, 2)] = -offset.y;
        Self::new(camera, h, seed)
    }

    pub fn with_jitter(mut self, jitter_px: Real) -> Self {
        self.jitter_px = jitter_px;
        self
    }

    /// Report every `n`-th poll as not worn.
    pub fn with_dropout_every(mut self, n: usize) -> Self {
        self.dropout_every = (n > 0).then_some(n);
        self
    }

    /// Point on the screen the simulated user looks at.
    pub fn look_at(&mut self, screen: Pt2) {
        self.look_at = screen;
    }

    /// Ideal undistorted gaze point for a screen position.
    pub fn ideal_gaze(&self, screen: &Pt2) -> Option<Pt2> {
        from_homogeneous(&(self.screen_to_gaze * to_homogeneous(screen)))
    }
}

impl GazeSource for SyntheticGazeSource {
    fn poll_sample(&mut self) -> Option<GazeSample> {
        self.polls += 1;
        let ideal = self.ideal_gaze(&self.look_at)?;
        let noisy = ideal + self.rng.jitter(self.jitter_px);
        let raw = self.camera.distort(&noisy);
        let worn = !matches!(self.dropout_every, Some(n) if self.polls % n == 0);
        Some(GazeSample::new(raw.x, raw.y, worn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_core::{AnyDistortion, PinholeIntrinsics, SensorResolution};

    fn camera() -> Arc<CameraIntrinsics> {
        Arc::new(CameraIntrinsics::new(
            PinholeIntrinsics {
                fx: 900.0,
                fy: 900.0,
                cx: 800.0,
                cy: 600.0,
                skew: 0.0,
            },
            AnyDistortion::from_opencv_coeffs(&[-0.2, 0.05, 0.0, 0.0, 0.0]).unwrap_or_default(),
            SensorResolution {
                width: 1600,
                height: 1200,
            },
        ))
    }

    #[test]
    fn splitmix_is_deterministic() {
        let mut a = SplitMix64::new(7);
        let mut b = SplitMix64::new(7);
        let xs: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);
        assert_ne!(xs[0], xs[1]);
        let j = a.jitter(2.0);
        assert!(j.x.abs() <= 2.0 && j.y.abs() <= 2.0);
    }

    #[test]
    fn scripted_source_replays_then_runs_dry() {
        let mut s = ScriptedGazeSource::new([Some(GazeSample::valid(1.0, 2.0)), None]);
        assert_eq!(s.poll_sample(), Some(GazeSample::valid(1.0, 2.0)));
        assert_eq!(s.poll_sample(), None);
        assert_eq!(s.remaining(), 0);
        assert_eq!(s.poll_sample(), None);
    }

    #[test]
    fn synthetic_samples_undistort_to_ideal_gaze() {
        let cam = camera();
        let mut src = SyntheticGazeSource::translated(cam.clone(), Vec2::new(50.0, 50.0), 1);
        src.look_at(Pt2::new(700.0, 400.0));
        let s = src.poll_sample().unwrap();
        assert!(s.valid);
        let g = cam.undistort(&s.position);
        assert!((g - Pt2::new(650.0, 350.0)).norm() < 1e-6);
    }

    #[test]
    fn dropout_marks_samples_not_worn() {
        let mut src = SyntheticGazeSource::translated(camera(), Vec2::zeros(), 3)
            .with_dropout_every(3);
        let valid: Vec<bool> = (0..6).map(|_| src.poll_sample().unwrap().valid).collect();
        assert_eq!(valid, vec![true, true, false, true, true, false]);
    }
}
