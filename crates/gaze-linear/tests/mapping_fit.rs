use gaze_core::{from_homogeneous, to_homogeneous, Mat3, Pt2, Real};
use gaze_linear::{DegeneracyKind, FitError, Mapping, MappingKind, PointPair, PointSet};

fn layout() -> Vec<Pt2> {
    vec![
        Pt2::new(960.0, 540.0),
        Pt2::new(100.0, 100.0),
        Pt2::new(1820.0, 100.0),
        Pt2::new(100.0, 980.0),
        Pt2::new(1820.0, 980.0),
    ]
}

/// Screen -> gaze view as a head-mounted scene camera would see it.
fn scene_view() -> Mat3 {
    #[rustfmt::skip]
    let h = Mat3::new(
        0.42,    0.02,   410.0,
        -0.015,  0.40,   290.0,
        0.00002, 0.00001, 1.0,
    );
    h
}

fn pairs_from(view: &Mat3, screen: &[Pt2]) -> Vec<PointPair> {
    screen
        .iter()
        .map(|s| {
            let g = from_homogeneous(&(view * to_homogeneous(s))).unwrap();
            PointPair::new(g, *s)
        })
        .collect()
}

#[test]
fn projective_fit_inverts_scene_view_everywhere() {
    let view = scene_view();
    let pairs = pairs_from(&view, &layout());
    let mapping = Mapping::fit(&pairs, MappingKind::Projective).unwrap();

    for &(x, y) in &[(300.0, 700.0), (1500.0, 250.0), (960.0, 1000.0)] {
        let screen = Pt2::new(x, y);
        let gaze = from_homogeneous(&(view * to_homogeneous(&screen))).unwrap();
        let back = mapping.apply(&gaze).unwrap();
        assert!((back - screen).norm() < 1e-5, "{back:?} vs {screen:?}");
    }
}

#[test]
fn affine_fit_leaves_residual_on_perspective_data() {
    let pairs = pairs_from(&scene_view(), &layout());
    let affine = Mapping::fit(&pairs, MappingKind::Affine).unwrap();
    let projective = Mapping::fit(&pairs, MappingKind::Projective).unwrap();
    assert!(affine.rms_error(&pairs) > projective.rms_error(&pairs));
    assert!(projective.rms_error(&pairs) < 1e-6);
}

#[test]
fn four_remaining_points_with_a_diagonal_are_degenerate_for_projective() {
    // Dropping a corner from center-plus-corners leaves the center on the
    // diagonal between two of the remaining corners.
    let mut screen = layout();
    screen.remove(1);
    let pairs = pairs_from(&scene_view(), &screen);

    match Mapping::fit(&pairs, MappingKind::Projective) {
        Err(FitError::Degenerate(DegeneracyKind::CollinearTriple { .. })) => {}
        other => panic!("expected collinear triple, got {other:?}"),
    }
    // An affine model only needs three of them and stays well posed.
    assert!(Mapping::fit(&pairs, MappingKind::Affine).is_ok());
}

#[test]
fn all_but_one_gaze_point_on_a_line_is_underdetermined() {
    // Four points on the diagonal plus one off it: every homography in a
    // one-parameter family fits exactly, so no single answer is returned.
    let inverse = scene_view().try_inverse().unwrap();
    let gaze = [
        Pt2::new(100.0, 100.0),
        Pt2::new(300.0, 300.0),
        Pt2::new(500.0, 500.0),
        Pt2::new(700.0, 700.0),
        Pt2::new(600.0, 150.0),
    ];
    let pairs: Vec<PointPair> = gaze
        .iter()
        .map(|g| PointPair::new(*g, from_homogeneous(&(inverse * to_homogeneous(g))).unwrap()))
        .collect();

    assert_eq!(
        Mapping::fit(&pairs, MappingKind::Projective),
        Err(FitError::Degenerate(DegeneracyKind::NoGeneralPosition(PointSet::Gaze)))
    );
    assert!(Mapping::fit(&pairs, MappingKind::Affine).is_ok());

    // One more point off the line pins the homography down.
    let mut pairs = pairs;
    let extra = Pt2::new(150.0, 650.0);
    pairs.push(PointPair::new(
        extra,
        from_homogeneous(&(inverse * to_homogeneous(&extra))).unwrap(),
    ));
    let mapping = Mapping::fit(&pairs, MappingKind::Projective).unwrap();
    let check = Pt2::new(400.0, 620.0);
    let expected = from_homogeneous(&(inverse * to_homogeneous(&check))).unwrap();
    assert!((mapping.apply(&check).unwrap() - expected).norm() < 1e-4);
}

#[test]
fn collinear_screen_targets_are_rejected() {
    let screen: Vec<Pt2> = (0..5).map(|i| Pt2::new(100.0 + 400.0 * i as Real, 540.0)).collect();
    let gaze: Vec<Pt2> = (0..5)
        .map(|i| Pt2::new(400.0 + 90.0 * i as Real, 300.0 + 7.0 * (i * i) as Real))
        .collect();
    let pairs: Vec<PointPair> = gaze
        .into_iter()
        .zip(screen)
        .map(|(g, s)| PointPair::new(g, s))
        .collect();
    assert_eq!(
        Mapping::fit(&pairs, MappingKind::Projective),
        Err(FitError::Degenerate(DegeneracyKind::Collinear(PointSet::Screen)))
    );
}

#[test]
fn refit_fully_replaces_previous_mapping() {
    let screen = layout();
    let first = Mapping::fit(&pairs_from(&scene_view(), &screen), MappingKind::Projective).unwrap();
    let shifted: Vec<PointPair> = screen
        .iter()
        .map(|s| PointPair::new(Pt2::new(s.x - 50.0, s.y - 50.0), *s))
        .collect();
    let second = Mapping::fit(&shifted, MappingKind::Projective).unwrap();

    let out = second.apply(&Pt2::new(200.0, 200.0)).unwrap();
    assert!((out.x - 250.0).abs() < 1e-6);
    assert!((out.y - 250.0).abs() < 1e-6);
    assert!((first.matrix() - second.matrix()).norm() > 1.0);
}
