use std::sync::Arc;

use gaze_core::{AnyDistortion, CameraIntrinsics, Mat3, PinholeIntrinsics, Pt2, SensorResolution};
use gaze_linear::{DegeneracyKind, FitError, Mapping, PointPair};
use gaze_pipeline::{
    CalibrationSession, Clock, Direction, ManualClock, NudgeMagnitude, Phase, SessionCommand,
    SessionConfig, SessionEvent, SyntheticGazeSource, TargetLayout, WarmupOptions,
};

fn camera() -> Arc<CameraIntrinsics> {
    let coeffs = [-0.21, 0.06, 0.0004, -0.0003, 0.0];
    Arc::new(CameraIntrinsics::new(
        PinholeIntrinsics {
            fx: 890.0,
            fy: 888.0,
            cx: 805.0,
            cy: 598.0,
            skew: 0.0,
        },
        AnyDistortion::from_opencv_coeffs(&coeffs).unwrap_or_default(),
        SensorResolution {
            width: 1600,
            height: 1200,
        },
    ))
}

fn scene_view() -> Mat3 {
    #[rustfmt::skip]
    let h = Mat3::new(
        0.41,    0.015,  420.0,
        -0.01,   0.40,   310.0,
        0.00002, 0.00001, 1.0,
    );
    h
}

fn six_point_config() -> SessionConfig {
    SessionConfig {
        targets: TargetLayout::Explicit {
            points: vec![
                [960.0, 540.0],
                [100.0, 100.0],
                [1820.0, 100.0],
                [100.0, 980.0],
                [1820.0, 980.0],
                [480.0, 300.0],
            ],
        },
        warmup: WarmupOptions {
            samples: 5,
            interval_ms: 10,
        },
        ..Default::default()
    }
}

type Session<'a> = CalibrationSession<SyntheticGazeSource, &'a ManualClock>;

/// Confirm once with the simulated user looking at the current target.
fn confirm_on_target(session: &mut Session<'_>) -> Vec<SessionEvent> {
    if let Some((_, target)) = session.current_target() {
        session.source_mut().look_at(target);
    }
    session.handle(SessionCommand::Confirm).unwrap()
}

fn calibrated(config: SessionConfig, clock: &ManualClock) -> Session<'_> {
    let source = SyntheticGazeSource::new(camera(), scene_view(), 42).with_jitter(0.5);
    let mut session = CalibrationSession::new(config, camera(), source, clock);
    session.start();
    while matches!(session.phase(), Phase::Capture { .. }) {
        confirm_on_target(&mut session);
    }
    session
}

#[test]
fn burst_capture_blocks_for_paced_window() {
    let clock = ManualClock::new();
    let before = clock.now();
    let session = calibrated(six_point_config(), &clock);
    assert_eq!(session.phase(), Phase::Replay);

    // 4 warmup pauses, then 29 pauses per burst for six targets.
    let elapsed = clock.now() - before;
    assert_eq!(elapsed.as_millis(), 40 + 6 * 290);
}

#[test]
fn calibrated_mapping_recovers_screen_positions() {
    let clock = ManualClock::new();
    let session = calibrated(six_point_config(), &clock);
    let mapping = session.mapping().unwrap();

    for row in session.replay_view() {
        assert!(row.residual.unwrap() < 2.0, "row {row:?}");
    }

    let viewer = SyntheticGazeSource::new(camera(), scene_view(), 0);
    let gaze = viewer.ideal_gaze(&Pt2::new(1400.0, 700.0)).unwrap();
    let screen = mapping.apply(&gaze).unwrap();
    assert!((screen - Pt2::new(1400.0, 700.0)).norm() < 3.0, "{screen:?}");
}

#[test]
fn redo_clears_one_point_and_refits_over_the_rest() {
    let clock = ManualClock::new();
    let mut session = calibrated(six_point_config(), &clock);
    let before: Vec<_> = session.points().to_vec();

    let events = session.handle(SessionCommand::Redo(2)).unwrap();
    assert_eq!(session.phase(), Phase::Capture { index: 2, redo: true });
    assert!(matches!(events[0], SessionEvent::MappingUpdated { pairs: 5, .. }));

    for (i, (now, was)) in session.points().iter().zip(&before).enumerate() {
        if i == 2 {
            assert!(now.gaze.is_none());
        } else {
            assert_eq!(now, was);
        }
    }

    let remaining: Vec<PointPair> = before
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 2)
        .map(|(_, p)| PointPair::new(p.gaze.unwrap(), p.destination()))
        .collect();
    let expected = Mapping::fit(&remaining, session.config().mapping_kind).unwrap();
    let during_redo = session.mapping().unwrap();
    assert!((during_redo.matrix() - expected.matrix()).norm() < 1e-9);

    let events = confirm_on_target(&mut session);
    assert!(matches!(events[0], SessionEvent::Captured { index: 2, .. }));
    assert_eq!(session.phase(), Phase::Replay);
    assert_eq!(session.records().len(), 6);
}

#[test]
fn default_layout_corner_redo_runs_unmapped_until_recaptured() {
    let clock = ManualClock::new();
    let config = SessionConfig {
        warmup: WarmupOptions {
            samples: 5,
            interval_ms: 10,
        },
        ..Default::default()
    };
    let mut session = calibrated(config, &clock);
    assert!(session.mapping().is_some());

    // Center plus two corners on the same diagonal leave no projective fit.
    let events = session.handle(SessionCommand::Redo(2)).unwrap();
    assert!(
        matches!(
            &events[0],
            SessionEvent::MappingCleared {
                pairs: 4,
                reason: FitError::Degenerate(DegeneracyKind::CollinearTriple { .. }),
            }
        ),
        "{events:?}"
    );
    assert_eq!(
        events[1],
        SessionEvent::PhaseChanged(Phase::Capture { index: 2, redo: true })
    );
    assert!(session.mapping().is_none());
    let last = session.log().last().unwrap();
    assert_eq!(last.operation, "refit");
    assert!(!last.success);

    let events = confirm_on_target(&mut session);
    assert!(matches!(events[0], SessionEvent::Captured { index: 2, .. }));
    assert!(matches!(events[1], SessionEvent::MappingUpdated { pairs: 5, .. }));
    assert!(session.mapping().is_some());
    assert_eq!(session.phase(), Phase::Replay);
}

#[test]
fn nudges_offset_adjusted_point_by_whole_steps() {
    let clock = ManualClock::new();
    let mut session = calibrated(six_point_config(), &clock);
    let gaze = session.points()[1].gaze.unwrap();
    let mapped = session.mapping().unwrap().apply(&gaze).unwrap();

    session.handle(SessionCommand::ManualEdit(1)).unwrap();
    assert_eq!(
        session.phase(),
        Phase::ManualEdit {
            index: 1,
            pending: mapped
        }
    );
    for _ in 0..3 {
        session
            .handle(SessionCommand::Nudge {
                direction: Direction::Right,
                magnitude: NudgeMagnitude::Small,
            })
            .unwrap();
    }
    session
        .handle(SessionCommand::Nudge {
            direction: Direction::Up,
            magnitude: NudgeMagnitude::Large,
        })
        .unwrap();
    let events = session.handle(SessionCommand::ConfirmEdit).unwrap();
    assert!(matches!(events[0], SessionEvent::EditCommitted { index: 1, .. }));
    assert_eq!(session.phase(), Phase::Replay);

    let adjusted = session.points()[1].adjusted.unwrap();
    assert!((adjusted.x - (mapped.x + 3.0)).abs() < 1e-9);
    assert!((adjusted.y - (mapped.y - 10.0)).abs() < 1e-9);
    assert_eq!(session.records()[1].adjusted, Some([adjusted.x, adjusted.y]));
}

#[test]
fn cancel_keeps_previously_committed_adjustment() {
    let clock = ManualClock::new();
    let mut session = calibrated(six_point_config(), &clock);

    session.handle(SessionCommand::ManualEdit(4)).unwrap();
    session
        .handle(SessionCommand::Nudge {
            direction: Direction::Left,
            magnitude: NudgeMagnitude::Large,
        })
        .unwrap();
    session.handle(SessionCommand::ConfirmEdit).unwrap();
    let committed = session.points()[4].adjusted.unwrap();

    session.handle(SessionCommand::ManualEdit(4)).unwrap();
    session
        .handle(SessionCommand::Nudge {
            direction: Direction::Down,
            magnitude: NudgeMagnitude::Large,
        })
        .unwrap();
    let events = session.handle(SessionCommand::Cancel).unwrap();
    assert_eq!(events[0], SessionEvent::EditCancelled { index: 4 });
    assert_eq!(session.phase(), Phase::Replay);
    assert_eq!(session.points()[4].adjusted, Some(committed));
}

#[test]
fn recapture_after_redo_drops_adjustment() {
    let clock = ManualClock::new();
    let mut session = calibrated(six_point_config(), &clock);
    session.handle(SessionCommand::ManualEdit(0)).unwrap();
    session
        .handle(SessionCommand::Nudge {
            direction: Direction::Down,
            magnitude: NudgeMagnitude::Small,
        })
        .unwrap();
    session.handle(SessionCommand::ConfirmEdit).unwrap();
    assert!(session.points()[0].adjusted.is_some());

    session.handle(SessionCommand::Redo(0)).unwrap();
    confirm_on_target(&mut session);
    assert!(session.points()[0].adjusted.is_none());
    assert!(session.points()[0].gaze.is_some());
}

#[test]
fn unreliable_device_keeps_capture_pending() {
    let clock = ManualClock::new();
    let source = SyntheticGazeSource::new(camera(), scene_view(), 5).with_dropout_every(2);
    let mut session = CalibrationSession::new(six_point_config(), camera(), source, &clock);
    session.start();

    let events = confirm_on_target(&mut session);
    match events.as_slice() {
        [SessionEvent::CaptureFailed {
            index: 0,
            valid,
            required: 21,
        }] => assert_eq!(*valid, 15),
        other => panic!("unexpected events {other:?}"),
    }
    assert_eq!(session.phase(), Phase::Capture { index: 0, redo: false });
    assert!(session.records().is_empty());
}
