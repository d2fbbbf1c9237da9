use std::time::{Duration, Instant};

use gaze_core::{Pt2, Real, Region};

use super::{CompletionPolicy, FixationDetector, FixationEvent};
use crate::config::FixationConfig;

/// Dwell on the aim cursor itself.
///
/// The watched region is a circle anchored where the cursor settled. Moving
/// out of it re-anchors at the new position and restarts the dwell.
#[derive(Debug, Clone)]
pub struct AimTracker {
    radius: Real,
    anchor: Option<Pt2>,
    detector: FixationDetector,
}

impl AimTracker {
    pub fn new(dwell: Duration, radius: Real) -> Self {
        Self {
            radius,
            anchor: None,
            detector: FixationDetector::new(dwell, CompletionPolicy::Hold),
        }
    }

    pub fn from_config(config: &FixationConfig) -> Self {
        Self::new(config.aim_dwell(), config.aim_radius_px)
    }

    pub fn anchor(&self) -> Option<Pt2> {
        self.anchor
    }

    /// True once the cursor has dwelt long enough; stays true until it moves away.
    pub fn is_locked(&self) -> bool {
        self.detector.is_held()
    }

    pub fn progress(&self, now: Instant) -> Real {
        self.detector.progress(now)
    }

    pub fn update(&mut self, cursor: Pt2, now: Instant) -> Option<FixationEvent> {
        let inside = self
            .anchor
            .is_some_and(|a| Region::circle(a, self.radius).contains(&cursor));
        if !inside {
            self.anchor = Some(cursor);
            self.detector.reset();
        }
        self.detector.update(true, now)
    }

    /// Forget the anchor (e.g. the cursor fell back to the pointer).
    pub fn reset(&mut self) {
        self.anchor = None;
        self.detector.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn locks_after_short_dwell_and_unlocks_on_move() {
        let t0 = Instant::now();
        let mut aim = AimTracker::from_config(&FixationConfig::default());

        assert_eq!(aim.update(Pt2::new(500.0, 500.0), t0), Some(FixationEvent::Started));
        assert_eq!(
            aim.update(Pt2::new(510.0, 495.0), t0 + 20 * MS),
            Some(FixationEvent::Complete)
        );
        assert!(aim.is_locked());
        assert_eq!(aim.update(Pt2::new(520.0, 500.0), t0 + 40 * MS), None);

        assert_eq!(
            aim.update(Pt2::new(700.0, 500.0), t0 + 50 * MS),
            Some(FixationEvent::Started)
        );
        assert!(!aim.is_locked());
        assert_eq!(aim.anchor(), Some(Pt2::new(700.0, 500.0)));
    }
}
