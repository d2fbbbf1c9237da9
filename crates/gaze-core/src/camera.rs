//! Scene-camera intrinsics as loaded from disk.
//!
//! The file format is the one eye-tracker vendors ship for the scene camera:
//!
//! ```json
//! {
//!   "camera_matrix": [[890.1, 0.0, 801.2], [0.0, 889.7, 602.4], [0.0, 0.0, 1.0]],
//!   "distortion_coefficients": [[-0.13, 0.11, 0.0002, -0.0003, 0.0, 0.17, 0.05, 0.02]],
//!   "resolution": [1600, 1200]
//! }
//! ```
//!
//! `distortion_coefficients` may be flat or nested one level deep and holds 4, 5
//! or 8 coefficients in OpenCV order. `resolution` is optional.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    distort_pixel, mat3_from_rows, mat3_to_rows, undistort_pixel, AnyDistortion,
    PinholeIntrinsics, Pt2, Real,
};

/// Scene-camera resolution used when the intrinsics file does not carry one.
pub const DEFAULT_SENSOR_RESOLUTION: SensorResolution = SensorResolution {
    width: 1600,
    height: 1200,
};

#[derive(Debug, Error)]
pub enum IntrinsicsError {
    #[error("failed to read intrinsics file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed intrinsics JSON")]
    Parse(#[from] serde_json::Error),
    #[error("invalid camera matrix: {0}")]
    InvalidCameraMatrix(&'static str),
    #[error("unsupported number of distortion coefficients: {0} (expected 0, 4, 5 or 8)")]
    UnsupportedDistortion(usize),
    #[error("invalid sensor resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
}

/// Pixel dimensions of the scene camera sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorResolution {
    pub width: u32,
    pub height: u32,
}

/// Immutable camera description: pinhole intrinsics, distortion and resolution.
///
/// Loaded once at startup and shared by reference (usually behind an `Arc`).
#[derive(Clone, Debug, PartialEq)]
pub struct CameraIntrinsics {
    intrinsics: PinholeIntrinsics,
    distortion: AnyDistortion,
    resolution: SensorResolution,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Coefficients {
    Flat(Vec<Real>),
    Nested(Vec<Vec<Real>>),
}

impl Coefficients {
    fn flatten(self) -> Vec<Real> {
        match self {
            Coefficients::Flat(v) => v,
            Coefficients::Nested(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct IntrinsicsFile {
    camera_matrix: [[Real; 3]; 3],
    #[serde(default)]
    distortion_coefficients: Option<Coefficients>,
    #[serde(default)]
    resolution: Option<[u32; 2]>,
}

impl CameraIntrinsics {
    /// Assemble intrinsics from already validated parts.
    pub fn new(
        intrinsics: PinholeIntrinsics,
        distortion: AnyDistortion,
        resolution: SensorResolution,
    ) -> Self {
        Self {
            intrinsics,
            distortion,
            resolution,
        }
    }

    /// Build from a camera matrix and an OpenCV-ordered coefficient vector.
    ///
    /// # Errors
    ///
    /// Fails if the matrix is not a valid pinhole `K` or the coefficient
    /// count is unsupported.
    pub fn from_parts(
        camera_matrix: &[[Real; 3]; 3],
        coefficients: &[Real],
        resolution: SensorResolution,
    ) -> Result<Self, IntrinsicsError> {
        let k = mat3_from_rows(camera_matrix);
        if k.iter().any(|v| !v.is_finite()) {
            return Err(IntrinsicsError::InvalidCameraMatrix("non-finite entry"));
        }
        let intrinsics = PinholeIntrinsics::from_matrix(&k).ok_or(
            IntrinsicsError::InvalidCameraMatrix("expected [[fx, s, cx], [0, fy, cy], [0, 0, 1]]"),
        )?;
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(IntrinsicsError::InvalidCameraMatrix(
                "non-finite distortion coefficient",
            ));
        }
        let distortion = AnyDistortion::from_opencv_coeffs(coefficients)
            .ok_or(IntrinsicsError::UnsupportedDistortion(coefficients.len()))?;
        if resolution.width == 0 || resolution.height == 0 {
            return Err(IntrinsicsError::InvalidResolution {
                width: resolution.width,
                height: resolution.height,
            });
        }
        Ok(Self::new(intrinsics, distortion, resolution))
    }

    /// Parse the JSON intrinsics format.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or invalid camera parameters.
    pub fn from_json_str(json: &str) -> Result<Self, IntrinsicsError> {
        let file: IntrinsicsFile = serde_json::from_str(json)?;
        let coefficients = file
            .distortion_coefficients
            .map(Coefficients::flatten)
            .unwrap_or_default();
        let resolution = file
            .resolution
            .map(|[width, height]| SensorResolution { width, height })
            .unwrap_or(DEFAULT_SENSOR_RESOLUTION);
        Self::from_parts(&file.camera_matrix, &coefficients, resolution)
    }

    /// Load the JSON intrinsics file from disk.
    ///
    /// # Errors
    ///
    /// I/O and validation errors are returned as-is; callers treat them as fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IntrinsicsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| IntrinsicsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let camera = Self::from_json_str(&json)?;
        debug!(
            "loaded scene camera intrinsics from {}: fx={:.1} fy={:.1} cx={:.1} cy={:.1}",
            path.display(),
            camera.intrinsics.fx,
            camera.intrinsics.fy,
            camera.intrinsics.cx,
            camera.intrinsics.cy
        );
        Ok(camera)
    }

    /// Serialize back to the JSON file format (flat coefficient list).
    pub fn to_json_string(&self) -> Result<String, IntrinsicsError> {
        let coefficients = match self.distortion {
            AnyDistortion::None => Vec::new(),
            AnyDistortion::BrownConrady5(d) => vec![d.k1, d.k2, d.p1, d.p2, d.k3],
            AnyDistortion::RationalPolynomial8(d) => {
                vec![d.k1, d.k2, d.p1, d.p2, d.k3, d.k4, d.k5, d.k6]
            }
        };
        let file = IntrinsicsFile {
            camera_matrix: mat3_to_rows(&self.intrinsics.k_matrix()),
            distortion_coefficients: Some(Coefficients::Flat(coefficients)),
            resolution: Some([self.resolution.width, self.resolution.height]),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn intrinsics(&self) -> &PinholeIntrinsics {
        &self.intrinsics
    }

    pub fn distortion(&self) -> &AnyDistortion {
        &self.distortion
    }

    pub fn resolution(&self) -> SensorResolution {
        self.resolution
    }

    /// Remove lens distortion from a raw scene-camera pixel.
    ///
    /// An all-zero model returns the pixel untouched.
    pub fn undistort(&self, raw: &Pt2) -> Pt2 {
        if self.distortion.is_identity() {
            return *raw;
        }
        undistort_pixel(raw, &self.intrinsics, &self.distortion)
    }

    /// Apply lens distortion to an ideal pixel (synthetic data, tests).
    pub fn distort(&self, ideal: &Pt2) -> Pt2 {
        distort_pixel(ideal, &self.intrinsics, &self.distortion)
    }
}
