use std::fmt;
use std::time::{Duration, Instant};

use gaze_core::{Pt2, Real, Region};
use log::info;

use super::{FixationDetector, FixationEvent};

/// Handle of a target registered on a [`FixationBoard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Target {
    id: TargetId,
    region: Region,
    detector: FixationDetector,
}

/// Static selectable targets, each with its own dwell detector.
#[derive(Debug, Clone)]
pub struct FixationBoard {
    dwell: Duration,
    targets: Vec<Target>,
    next_id: u64,
}

impl FixationBoard {
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell,
            targets: Vec::new(),
            next_id: 0,
        }
    }

    pub fn add(&mut self, region: Region) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.push(Target {
            id,
            region,
            detector: FixationDetector::one_shot(self.dwell),
        });
        id
    }

    pub fn remove(&mut self, id: TargetId) -> Option<Region> {
        let pos = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(pos).region)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn region(&self, id: TargetId) -> Option<&Region> {
        self.targets.iter().find(|t| t.id == id).map(|t| &t.region)
    }

    pub fn progress(&self, id: TargetId, now: Instant) -> Option<Real> {
        self.targets
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.detector.progress(now))
    }

    /// Feed this frame's cursor to every target.
    ///
    /// Targets whose dwell completes are removed before returning.
    pub fn update(&mut self, cursor: Pt2, now: Instant) -> Vec<(TargetId, FixationEvent)> {
        let mut events = Vec::new();
        for target in &mut self.targets {
            let inside = target.region.contains(&cursor);
            if let Some(event) = target.detector.update(inside, now) {
                events.push((target.id, event));
            }
        }
        let before = self.targets.len();
        self.targets.retain(|t| {
            !events
                .iter()
                .any(|(id, e)| *id == t.id && *e == FixationEvent::Complete)
        });
        if self.targets.len() != before {
            info!(
                "{} target(s) selected by fixation, {} remaining",
                before - self.targets.len(),
                self.targets.len()
            );
        }
        events
    }
}
