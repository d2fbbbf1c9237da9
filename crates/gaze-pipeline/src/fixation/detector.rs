use std::time::{Duration, Instant};

use gaze_core::Real;

/// What happens once the dwell threshold is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// Fire `Complete` once and return to `Idle` (the caller removes the target).
    #[default]
    OneShot,
    /// Fire `Complete` once and stay completed while the cursor remains inside.
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixationState {
    Idle,
    /// Cursor inside the region since `since`.
    Active { since: Instant },
    /// Completed under [`CompletionPolicy::Hold`]; cleared on exit.
    Held,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixationEvent {
    Started,
    /// Dwell fraction in `[0, 1)`, for visual feedback only.
    Progress(Real),
    Complete,
}

/// Per-region dwell state machine.
#[derive(Debug, Clone)]
pub struct FixationDetector {
    threshold: Duration,
    policy: CompletionPolicy,
    state: FixationState,
}

impl FixationDetector {
    pub fn new(threshold: Duration, policy: CompletionPolicy) -> Self {
        Self {
            threshold,
            policy,
            state: FixationState::Idle,
        }
    }

    pub fn one_shot(threshold: Duration) -> Self {
        Self::new(threshold, CompletionPolicy::OneShot)
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn state(&self) -> FixationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, FixationState::Active { .. })
    }

    pub fn is_held(&self) -> bool {
        self.state == FixationState::Held
    }

    pub fn reset(&mut self) {
        self.state = FixationState::Idle;
    }

    /// Dwell fraction at `now`, clamped to `[0, 1]`.
    pub fn progress(&self, now: Instant) -> Real {
        match self.state {
            FixationState::Idle => 0.0,
            FixationState::Held => 1.0,
            FixationState::Active { since } => {
                if self.threshold.is_zero() {
                    return 1.0;
                }
                let elapsed = now.saturating_duration_since(since);
                (elapsed.as_secs_f64() / self.threshold.as_secs_f64()).clamp(0.0, 1.0)
            }
        }
    }

    /// Advance with this frame's containment result.
    ///
    /// Entering emits `Started`; the dwell clock starts at that frame's
    /// `now`. Staying inside emits `Progress` until `now − since` reaches the
    /// threshold, which emits `Complete` exactly once. Leaving returns to
    /// `Idle` silently.
    pub fn update(&mut self, inside: bool, now: Instant) -> Option<FixationEvent> {
        match (self.state, inside) {
            (FixationState::Idle, false) => None,
            (FixationState::Idle, true) => {
                self.state = FixationState::Active { since: now };
                Some(FixationEvent::Started)
            }
            (FixationState::Active { .. } | FixationState::Held, false) => {
                self.state = FixationState::Idle;
                None
            }
            (FixationState::Held, true) => None,
            (FixationState::Active { since }, true) => {
                if now.saturating_duration_since(since) >= self.threshold {
                    self.state = match self.policy {
                        CompletionPolicy::OneShot => FixationState::Idle,
                        CompletionPolicy::Hold => FixationState::Held,
                    };
                    Some(FixationEvent::Complete)
                } else {
                    Some(FixationEvent::Progress(self.progress(now)))
                }
            }
        }
    }
}
