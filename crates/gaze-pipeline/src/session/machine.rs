use std::sync::Arc;

use gaze_core::{CameraIntrinsics, Pt2};
use gaze_linear::{FitError, Mapping, PointPair};
use log::{debug, info, warn};

use super::types::*;
use crate::aggregator::{capture_burst, drain_warmup, is_live};
use crate::artifact::CalibrationRecord;
use crate::config::SessionConfig;
use crate::{CaptureError, Clock, GazeSource};

/// Calibration session state container.
///
/// Owns the gaze source and clock for the duration of the session, the
/// target slots, and the most recent mapping. Every change to the set of
/// captured points (capture, redo, committed edit) triggers a full refit;
/// the mapping is replaced as a whole and shared as `Arc<Mapping>`, so a
/// runtime cursor holding the previous one is never left with a partial fit.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use gaze_pipeline::{CalibrationSession, SessionCommand, SessionConfig, NoSource, SystemClock};
/// # fn main() -> anyhow::Result<()> {
/// let camera = Arc::new(gaze_core::CameraIntrinsics::load("scene_camera.json")?);
/// let mut session = CalibrationSession::new(SessionConfig::default(), camera, NoSource, SystemClock);
/// session.start();
/// session.handle(SessionCommand::Confirm)?;
/// let records = session.finish();
/// # let _ = records;
/// # Ok(())
/// # }
/// ```
pub struct CalibrationSession<S, C> {
    config: SessionConfig,
    camera: Arc<CameraIntrinsics>,
    source: S,
    clock: C,
    points: Vec<CalibrationPoint>,
    phase: Phase,
    mapping: Option<Arc<Mapping>>,
    selected: Option<usize>,
    log: Vec<LogEntry>,
}

impl<S: GazeSource, C: Clock> CalibrationSession<S, C> {
    pub fn new(config: SessionConfig, camera: Arc<CameraIntrinsics>, source: S, clock: C) -> Self {
        let points = config
            .target_points()
            .into_iter()
            .map(CalibrationPoint::empty)
            .collect();
        Self {
            config,
            camera,
            source,
            clock,
            points,
            phase: Phase::Warmup,
            mapping: None,
            selected: None,
            log: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current mapping, if the captured points support one.
    pub fn mapping(&self) -> Option<Arc<Mapping>> {
        self.mapping.clone()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// The gaze source, e.g. to reconfigure a simulated device between commands.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Target currently awaiting capture, with its screen position.
    pub fn current_target(&self) -> Option<(usize, Pt2)> {
        match self.phase {
            Phase::Capture { index, .. } => Some((index, self.points[index].screen_target)),
            _ => None,
        }
    }

    /// Run the warmup drain and move to the first capture.
    ///
    /// Does nothing outside the warmup phase.
    pub fn start(&mut self) -> Vec<SessionEvent> {
        if self.phase != Phase::Warmup {
            return Vec::new();
        }
        let delivered = drain_warmup(&mut self.source, &self.clock, &self.config.warmup);
        self.log.push(LogEntry::success_with_notes(
            "warmup",
            format!("{delivered} samples drained"),
        ));
        let mut events = vec![SessionEvent::WarmupComplete { delivered }];
        let next = match self.next_unfilled() {
            Some(index) => Phase::Capture {
                index,
                redo: false,
            },
            None => Phase::Replay,
        };
        events.push(self.enter(next));
        events
    }

    /// Apply one operator command.
    ///
    /// # Errors
    ///
    /// [`SessionError::TargetOutOfRange`] when a command names a target index
    /// the session does not have. The session state is unchanged in that case.
    pub fn handle(&mut self, command: SessionCommand) -> Result<Vec<SessionEvent>, SessionError> {
        if let SessionCommand::SelectTarget(index)
        | SessionCommand::Redo(index)
        | SessionCommand::ManualEdit(index) = command
        {
            self.check_index(index)?;
        }

        let events = match (self.phase, command) {
            (Phase::Done, cmd) => vec![SessionEvent::Ignored(cmd)],
            (_, SessionCommand::Quit) => vec![self.quit()],
            (Phase::ManualEdit { index, .. }, SessionCommand::Cancel) => {
                debug!("manual edit of target {index} cancelled");
                vec![
                    SessionEvent::EditCancelled { index },
                    self.enter(Phase::Replay),
                ]
            }
            (_, SessionCommand::Cancel) => vec![self.quit()],
            (Phase::Warmup, SessionCommand::Confirm) => self.start(),
            (Phase::Capture { index, redo }, SessionCommand::Confirm) => self.capture(index, redo),
            (Phase::Replay, SessionCommand::SelectTarget(index)) => {
                self.selected = Some(index);
                vec![SessionEvent::TargetSelected(index)]
            }
            (Phase::Replay, SessionCommand::Redo(index)) => self.redo(index),
            (Phase::Replay, SessionCommand::ManualEdit(index)) => self.begin_edit(index),
            (
                Phase::ManualEdit { index, pending },
                SessionCommand::Nudge {
                    direction,
                    magnitude,
                },
            ) => {
                let position = pending + direction.unit() * self.config.nudge.step(magnitude);
                self.phase = Phase::ManualEdit {
                    index,
                    pending: position,
                };
                vec![SessionEvent::Nudged { index, position }]
            }
            (Phase::ManualEdit { index, pending }, SessionCommand::ConfirmEdit) => {
                self.commit_edit(index, pending)
            }
            (_, cmd) => {
                debug!("ignoring {cmd:?} in phase {:?}", self.phase);
                vec![SessionEvent::Ignored(cmd)]
            }
        };
        Ok(events)
    }

    /// Per-target estimates for visual verification.
    pub fn replay_view(&self) -> Vec<ReplayRow> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let mapped = match (&self.mapping, p.gaze) {
                    (Some(m), Some(gaze)) => m.apply(&gaze),
                    _ => None,
                };
                let estimate = mapped.or_else(|| p.gaze.map(|_| p.destination()));
                ReplayRow {
                    index,
                    screen_target: p.screen_target,
                    estimate,
                    adjusted: p.adjusted,
                    residual: mapped.map(|m| (m - p.destination()).norm()),
                }
            })
            .collect()
    }

    /// Populated points in target order.
    pub fn records(&self) -> Vec<CalibrationRecord> {
        self.points
            .iter()
            .filter_map(CalibrationPoint::to_record)
            .collect()
    }

    /// End the session and return its output, whatever phase it was in.
    pub fn finish(mut self) -> Vec<CalibrationRecord> {
        if self.phase != Phase::Done {
            self.quit();
        }
        self.records()
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(SessionError::TargetOutOfRange {
                index,
                count: self.points.len(),
            })
        }
    }

    fn next_unfilled(&self) -> Option<usize> {
        self.points.iter().position(|p| !p.is_captured())
    }

    fn enter(&mut self, phase: Phase) -> SessionEvent {
        debug!("session phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        SessionEvent::PhaseChanged(phase)
    }

    fn quit(&mut self) -> SessionEvent {
        let captured = self.points.iter().filter(|p| p.is_captured()).count();
        info!(
            "calibration session finished with {captured}/{} points",
            self.points.len()
        );
        self.log.push(LogEntry::success_with_notes(
            "finish",
            format!("{captured}/{} points captured", self.points.len()),
        ));
        self.enter(Phase::Done)
    }

    fn capture(&mut self, index: usize, redo: bool) -> Vec<SessionEvent> {
        let result = capture_burst(
            &mut self.source,
            &self.clock,
            &self.camera,
            &self.config.capture,
            is_live,
        );
        let burst = match result {
            Ok(burst) => burst,
            Err(CaptureError::InsufficientSamples {
                valid,
                required,
                total,
            }) => {
                self.log.push(LogEntry::failure(
                    "capture",
                    format!("target {index}: {valid}/{total} valid, need {required}"),
                ));
                return vec![SessionEvent::CaptureFailed {
                    index,
                    valid,
                    required,
                }];
            }
        };

        let point = &mut self.points[index];
        point.gaze = Some(burst.gaze);
        point.adjusted = None;
        info!(
            "captured target {} at gaze ({:.1}, {:.1}) -> screen ({:.0}, {:.0})",
            index + 1,
            burst.gaze.x,
            burst.gaze.y,
            point.screen_target.x,
            point.screen_target.y
        );
        self.log.push(LogEntry::success_with_notes(
            "capture",
            format!(
                "target {index}{}: {}/{} valid",
                if redo { " (redo)" } else { "" },
                burst.valid,
                burst.total
            ),
        ));

        let mut events = vec![SessionEvent::Captured {
            index,
            gaze: burst.gaze,
            valid: burst.valid,
            total: burst.total,
        }];
        events.push(self.refit());
        let next = match (redo, self.next_unfilled()) {
            (false, Some(next)) => Phase::Capture {
                index: next,
                redo: false,
            },
            _ => Phase::Replay,
        };
        events.push(self.enter(next));
        events
    }

    fn redo(&mut self, index: usize) -> Vec<SessionEvent> {
        info!("redoing target {}", index + 1);
        self.points[index].clear();
        self.log.push(LogEntry::success_with_notes(
            "redo",
            format!("target {index} cleared"),
        ));
        let refit = self.refit();
        vec![
            refit,
            self.enter(Phase::Capture { index, redo: true }),
        ]
    }

    fn begin_edit(&mut self, index: usize) -> Vec<SessionEvent> {
        let point = self.points[index];
        let Some(gaze) = point.gaze else {
            debug!("target {index} has no data, manual edit ignored");
            return vec![SessionEvent::Ignored(SessionCommand::ManualEdit(index))];
        };
        let start = self
            .mapping
            .as_ref()
            .and_then(|m| m.apply(&gaze))
            .unwrap_or_else(|| point.destination());
        vec![self.enter(Phase::ManualEdit {
            index,
            pending: start,
        })]
    }

    fn commit_edit(&mut self, index: usize, adjusted: Pt2) -> Vec<SessionEvent> {
        self.points[index].adjusted = Some(adjusted);
        info!(
            "target {} adjusted to ({:.1}, {:.1})",
            index + 1,
            adjusted.x,
            adjusted.y
        );
        self.log.push(LogEntry::success_with_notes(
            "manual_edit",
            format!("target {index} -> ({:.1}, {:.1})", adjusted.x, adjusted.y),
        ));
        let refit = self.refit();
        vec![
            SessionEvent::EditCommitted { index, adjusted },
            refit,
            self.enter(Phase::Replay),
        ]
    }

    fn refit(&mut self) -> SessionEvent {
        let pairs: Vec<PointPair> = self
            .points
            .iter()
            .filter_map(|p| p.gaze.map(|g| PointPair::new(g, p.destination())))
            .collect();

        match Mapping::fit(&pairs, self.config.mapping_kind) {
            Ok(mapping) => {
                let rms_error = mapping.rms_error(&pairs);
                info!(
                    "mapping refit over {} points, rms={rms_error:.2}px",
                    pairs.len()
                );
                self.log.push(LogEntry::success_with_notes(
                    "refit",
                    format!("{} points, rms={rms_error:.3}px", pairs.len()),
                ));
                self.mapping = Some(Arc::new(mapping));
                SessionEvent::MappingUpdated {
                    pairs: pairs.len(),
                    rms_error,
                }
            }
            Err(reason) => {
                if let FitError::NotEnoughData { .. } = reason {
                    debug!("no mapping yet: {reason}");
                } else {
                    warn!("mapping refit failed, running unmapped: {reason}");
                    self.log.push(LogEntry::failure("refit", reason.to_string()));
                }
                self.mapping = None;
                SessionEvent::MappingCleared {
                    pairs: pairs.len(),
                    reason,
                }
            }
        }
    }
}
