use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use gaze::core::mat3_to_rows;
use gaze::runtime::{load_cursor, ManualClock};
use gaze::session::{SessionCommand, SessionEvent};
use gaze::synthetic::SyntheticGazeSource;
use gaze::{
    fit_artifact, load_artifact, save_artifact, CalibrationSession, CameraIntrinsics, GazeConfig,
    MappingKind, Pt2, Real, ScreenBounds, Vec2,
};
use log::info;
use serde::Serialize;

/// Gaze calibration tools.
#[derive(Debug, Parser)]
#[command(author, version, about = "Gaze calibration artifact tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fit a mapping from a calibration artifact and print it as JSON.
    Fit {
        /// Scene camera intrinsics JSON.
        #[arg(long)]
        intrinsics: PathBuf,
        /// Calibration artifact JSON.
        #[arg(long)]
        calibration: PathBuf,
        #[arg(long, value_enum, default_value_t = KindArg::Projective)]
        kind: KindArg,
    },
    /// Map one raw scene-camera pixel to a screen cursor position.
    Map {
        #[arg(long)]
        intrinsics: PathBuf,
        #[arg(long)]
        calibration: PathBuf,
        #[arg(long)]
        x: Real,
        #[arg(long)]
        y: Real,
        #[arg(long, default_value_t = 1920.0)]
        width: Real,
        #[arg(long, default_value_t = 1080.0)]
        height: Real,
    },
    /// Run a full calibration session against a simulated tracker.
    Simulate {
        #[arg(long)]
        intrinsics: PathBuf,
        /// Where to write the calibration artifact.
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 50.0, allow_negative_numbers = true)]
        offset_x: Real,
        #[arg(long, default_value_t = 50.0, allow_negative_numbers = true)]
        offset_y: Real,
        /// Per-sample gaze noise amplitude in scene-camera pixels.
        #[arg(long, default_value_t = 0.0)]
        jitter: Real,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Optional GazeConfig JSON. Defaults are used if omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Projective,
    Affine,
}

impl From<KindArg> for MappingKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Projective => MappingKind::Projective,
            KindArg::Affine => MappingKind::Affine,
        }
    }
}

#[derive(Debug, Serialize)]
struct FitReport {
    kind: MappingKind,
    points: usize,
    matrix: [[Real; 3]; 3],
    rms_error: Real,
    residuals: Vec<Real>,
}

#[derive(Debug, Serialize)]
struct MapReport {
    raw: [Real; 2],
    cursor: [Real; 2],
    mapped: bool,
}

#[derive(Debug, Serialize)]
struct SimulateReport {
    output: String,
    points: usize,
    rms_error: Option<Real>,
}

fn fit_from_files(intrinsics: &Path, calibration: &Path, kind: MappingKind) -> Result<String> {
    // Records hold undistorted gaze, the camera is only validated here.
    CameraIntrinsics::load(intrinsics)
        .with_context(|| format!("failed to load intrinsics from {}", intrinsics.display()))?;
    let records = load_artifact(calibration)?;
    let mapping = fit_artifact(&records, kind)
        .with_context(|| format!("cannot fit {} calibration points", records.len()))?;

    let pairs: Vec<_> = records.iter().map(|r| r.to_pair()).collect();
    let report = FitReport {
        kind: mapping.kind(),
        points: pairs.len(),
        matrix: mat3_to_rows(mapping.matrix()),
        rms_error: mapping.rms_error(&pairs),
        residuals: mapping.residuals(&pairs),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn map_from_files(
    intrinsics: &Path,
    calibration: &Path,
    raw: Pt2,
    screen: ScreenBounds,
) -> Result<String> {
    let mut config = GazeConfig::default().session;
    config.screen = screen;
    let cursor = load_cursor(intrinsics, calibration, &config)?;
    let Some(sample) = cursor.map_raw(&raw) else {
        bail!("({}, {}) maps to infinity", raw.x, raw.y);
    };
    let report = MapReport {
        raw: [raw.x, raw.y],
        cursor: [sample.position.x, sample.position.y],
        mapped: cursor.is_mapped(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn simulate_to_file(
    intrinsics: &Path,
    output: &Path,
    offset: Vec2,
    jitter: Real,
    seed: u64,
    config: Option<&Path>,
) -> Result<String> {
    let camera = Arc::new(
        CameraIntrinsics::load(intrinsics)
            .with_context(|| format!("failed to load intrinsics from {}", intrinsics.display()))?,
    );
    let config = match config {
        Some(path) => GazeConfig::load(path)?,
        None => GazeConfig::default(),
    };

    let source = SyntheticGazeSource::translated(camera.clone(), offset, seed).with_jitter(jitter);
    let clock = ManualClock::new();
    let mut session = CalibrationSession::new(config.session, camera, source, &clock);
    session.start();

    let mut rms_error = None;
    while let Some((index, target)) = session.current_target() {
        session.source_mut().look_at(target);
        for event in session.handle(SessionCommand::Confirm)? {
            match event {
                SessionEvent::CaptureFailed {
                    valid, required, ..
                } => bail!("capture of target {index} failed: {valid}/{required} valid samples"),
                SessionEvent::MappingUpdated { rms_error: e, .. } => rms_error = Some(e),
                SessionEvent::MappingCleared { .. } => rms_error = None,
                _ => {}
            }
        }
    }
    session.handle(SessionCommand::Quit)?;
    let records = session.finish();
    save_artifact(output, &records)?;
    info!("simulated calibration written to {}", output.display());

    let report = SimulateReport {
        output: output.display().to_string(),
        points: records.len(),
        rms_error,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let json = match args.command {
        Command::Fit {
            intrinsics,
            calibration,
            kind,
        } => fit_from_files(&intrinsics, &calibration, kind.into())?,
        Command::Map {
            intrinsics,
            calibration,
            x,
            y,
            width,
            height,
        } => map_from_files(
            &intrinsics,
            &calibration,
            Pt2::new(x, y),
            ScreenBounds::new(width, height),
        )?,
        Command::Simulate {
            intrinsics,
            output,
            offset_x,
            offset_y,
            jitter,
            seed,
            config,
        } => simulate_to_file(
            &intrinsics,
            &output,
            Vec2::new(offset_x, offset_y),
            jitter,
            seed,
            config.as_deref(),
        )?,
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze::core::{AnyDistortion, PinholeIntrinsics, SensorResolution};
    use std::fs;
    use tempfile::TempDir;

    fn write_camera(dir: &TempDir) -> PathBuf {
        let camera = CameraIntrinsics::new(
            PinholeIntrinsics {
                fx: 900.0,
                fy: 900.0,
                cx: 800.0,
                cy: 600.0,
                skew: 0.0,
            },
            AnyDistortion::None,
            SensorResolution {
                width: 1600,
                height: 1200,
            },
        );
        let path = dir.path().join("scene_camera.json");
        fs::write(&path, camera.to_json_string().unwrap()).unwrap();
        path
    }

    #[test]
    fn simulate_then_fit_and_map() {
        let dir = TempDir::new().unwrap();
        let intrinsics = write_camera(&dir);
        let artifact = dir.path().join("calibration.json");

        let json = simulate_to_file(
            &intrinsics,
            &artifact,
            Vec2::new(50.0, 50.0),
            0.0,
            3,
            None,
        )
        .expect("simulation should succeed");
        let summary: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(summary["points"], 5);
        assert!(summary["rms_error"].as_f64().unwrap() < 1e-6);

        let json = fit_from_files(&intrinsics, &artifact, MappingKind::Affine).unwrap();
        let fit: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(fit["kind"], "affine");
        assert!((fit["matrix"][0][2].as_f64().unwrap() - 50.0).abs() < 1e-6);

        let json = map_from_files(
            &intrinsics,
            &artifact,
            Pt2::new(200.0, 200.0),
            ScreenBounds::new(1920.0, 1080.0),
        )
        .unwrap();
        let mapped: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(mapped["mapped"], true);
        assert!((mapped["cursor"][0].as_f64().unwrap() - 250.0).abs() < 1e-6);
        assert!((mapped["cursor"][1].as_f64().unwrap() - 250.0).abs() < 1e-6);
    }

    #[test]
    fn fit_reports_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let intrinsics = write_camera(&dir);
        let err = fit_from_files(
            &intrinsics,
            &dir.path().join("missing.json"),
            MappingKind::Projective,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("missing.json"));
    }

    #[test]
    fn parses_subcommands() {
        let args = Args::try_parse_from([
            "gaze-cli",
            "simulate",
            "--intrinsics",
            "cam.json",
            "--output",
            "out.json",
            "--offset-x",
            "-20",
        ])
        .unwrap();
        match args.command {
            Command::Simulate { offset_x, jitter, .. } => {
                assert_eq!(offset_x, -20.0);
                assert_eq!(jitter, 0.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
