//! Burst capture: reduce a paced window of samples to one gaze point.

use gaze_core::{mean_point, CameraIntrinsics, Pt2};
use log::{debug, warn};
use thiserror::Error;

use crate::config::{CaptureOptions, WarmupOptions};
use crate::{Clock, GazeSample, GazeSource};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("only {valid} of {total} samples were valid, need {required}")]
    InsufficientSamples {
        valid: usize,
        required: usize,
        total: usize,
    },
}

/// Result of a successful burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstCapture {
    /// Mean of the undistorted valid samples.
    pub gaze: Pt2,
    pub valid: usize,
    pub total: usize,
}

/// Poll `opts.samples_per_point` samples, pausing `opts.sample_interval()`
/// between polls, and average the undistorted valid ones.
///
/// A sample counts only if it is present and `is_valid` accepts it; rejected
/// samples are dropped, not retried. This call blocks for roughly
/// `(samples_per_point - 1) × sample_interval`.
///
/// # Errors
///
/// [`CaptureError::InsufficientSamples`] when fewer than
/// [`CaptureOptions::required_valid`] samples survive, including the
/// all-invalid case.
pub fn capture_burst<S, C, F>(
    source: &mut S,
    clock: &C,
    camera: &CameraIntrinsics,
    opts: &CaptureOptions,
    is_valid: F,
) -> Result<BurstCapture, CaptureError>
where
    S: GazeSource + ?Sized,
    C: Clock + ?Sized,
    F: Fn(&GazeSample) -> bool,
{
    let total = opts.samples_per_point;
    let mut undistorted = Vec::with_capacity(total);
    for i in 0..total {
        if i > 0 {
            clock.sleep(opts.sample_interval());
        }
        if let Some(sample) = source.poll_sample().filter(|s| is_valid(s)) {
            undistorted.push(camera.undistort(&sample.position));
        }
    }

    let required = opts.required_valid();
    let valid = undistorted.len();
    let gaze = match mean_point(&undistorted) {
        Some(gaze) if valid >= required => gaze,
        _ => {
            warn!("burst capture rejected: {valid}/{total} valid samples, need {required}");
            return Err(CaptureError::InsufficientSamples {
                valid,
                required,
                total,
            });
        }
    };
    debug!(
        "burst capture: {valid}/{total} valid, mean=({:.2}, {:.2})",
        gaze.x, gaze.y
    );
    Ok(BurstCapture { gaze, valid, total })
}

/// Default validity predicate: the device's own liveness flag.
pub fn is_live(sample: &GazeSample) -> bool {
    sample.valid
}

/// Drain the source for the warmup window and discard everything.
///
/// Returns the number of samples that were actually delivered.
pub fn drain_warmup<S, C>(source: &mut S, clock: &C, opts: &WarmupOptions) -> usize
where
    S: GazeSource + ?Sized,
    C: Clock + ?Sized,
{
    let mut delivered = 0;
    for i in 0..opts.samples {
        if i > 0 {
            clock.sleep(opts.interval());
        }
        if source.poll_sample().is_some() {
            delivered += 1;
        }
    }
    debug!("warmup drained {delivered}/{} samples", opts.samples);
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::ScriptedGazeSource;
    use crate::ManualClock;
    use gaze_core::{AnyDistortion, PinholeIntrinsics, SensorResolution};
    use std::time::Duration;

    fn pinhole() -> CameraIntrinsics {
        CameraIntrinsics::new(
            PinholeIntrinsics {
                fx: 800.0,
                fy: 800.0,
                cx: 800.0,
                cy: 600.0,
                skew: 0.0,
            },
            AnyDistortion::None,
            SensorResolution {
                width: 1600,
                height: 1200,
            },
        )
    }

    fn opts(n: usize) -> CaptureOptions {
        CaptureOptions {
            samples_per_point: n,
            ..Default::default()
        }
    }

    #[test]
    fn all_valid_gives_exact_mean() {
        let samples: Vec<GazeSample> = (0..10)
            .map(|i| GazeSample::valid(100.0 + i as f64, 200.0 - 2.0 * i as f64))
            .collect();
        let mut source = ScriptedGazeSource::from_samples(samples);
        let clock = ManualClock::new();
        let t0 = clock.now();

        let burst = capture_burst(&mut source, &clock, &pinhole(), &opts(10), is_live).unwrap();
        assert!((burst.gaze.x - 104.5).abs() < 1e-9);
        assert!((burst.gaze.y - 191.0).abs() < 1e-9);
        assert_eq!((burst.valid, burst.total), (10, 10));
        assert_eq!(clock.now() - t0, Duration::from_millis(90));
    }

    #[test]
    fn fails_below_seventy_percent() {
        // 6 of 10 valid: below the 7 required.
        let samples: Vec<GazeSample> = (0..10)
            .map(|i| GazeSample::new(10.0, 10.0, i < 6))
            .collect();
        let mut source = ScriptedGazeSource::from_samples(samples);
        let err = capture_burst(&mut source, &ManualClock::new(), &pinhole(), &opts(10), is_live)
            .unwrap_err();
        assert_eq!(
            err,
            CaptureError::InsufficientSamples {
                valid: 6,
                required: 7,
                total: 10
            }
        );
    }

    #[test]
    fn exactly_seventy_percent_succeeds() {
        let samples: Vec<GazeSample> = (0..10)
            .map(|i| GazeSample::new(10.0 * i as f64, 0.0, i < 7))
            .collect();
        let mut source = ScriptedGazeSource::from_samples(samples);
        let burst =
            capture_burst(&mut source, &ManualClock::new(), &pinhole(), &opts(10), is_live).unwrap();
        assert_eq!(burst.valid, 7);
        assert!((burst.gaze.x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn missing_samples_count_as_invalid() {
        let mut source = ScriptedGazeSource::from_samples(Vec::new());
        let err = capture_burst(&mut source, &ManualClock::new(), &pinhole(), &opts(30), is_live)
            .unwrap_err();
        assert!(matches!(
            err,
            CaptureError::InsufficientSamples { valid: 0, .. }
        ));
    }

    #[test]
    fn warmup_discards_and_paces() {
        let mut source =
            ScriptedGazeSource::from_samples(vec![GazeSample::valid(1.0, 1.0); 5]);
        let clock = ManualClock::new();
        let t0 = clock.now();
        let opts = WarmupOptions {
            samples: 8,
            interval_ms: 10,
        };
        assert_eq!(drain_warmup(&mut source, &clock, &opts), 5);
        assert_eq!(clock.now() - t0, Duration::from_millis(70));
        assert!(source.poll_sample().is_none());
    }
}
