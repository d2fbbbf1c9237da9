//! Pull-based gaze sample source.

use gaze_core::{Pt2, Real};

/// One reading from the eye tracker, in raw (distorted) scene-camera pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub position: Pt2,
    /// Liveness flag reported by the device (e.g. glasses are worn).
    pub valid: bool,
}

impl GazeSample {
    pub fn new(x: Real, y: Real, valid: bool) -> Self {
        Self {
            position: Pt2::new(x, y),
            valid,
        }
    }

    pub fn valid(x: Real, y: Real) -> Self {
        Self::new(x, y, true)
    }

    pub fn invalid(x: Real, y: Real) -> Self {
        Self::new(x, y, false)
    }
}

/// A device (or simulation) that can be polled once per tick.
///
/// `poll_sample` must not block waiting for data: `None` means nothing is
/// available right now.
pub trait GazeSource {
    fn poll_sample(&mut self) -> Option<GazeSample>;
}

impl<S: GazeSource + ?Sized> GazeSource for &mut S {
    fn poll_sample(&mut self) -> Option<GazeSample> {
        (**self).poll_sample()
    }
}

impl<S: GazeSource + ?Sized> GazeSource for Box<S> {
    fn poll_sample(&mut self) -> Option<GazeSample> {
        (**self).poll_sample()
    }
}

/// Source used when no device is connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl GazeSource for NoSource {
    fn poll_sample(&mut self) -> Option<GazeSample> {
        None
    }
}
