//! Core math and camera primitives for gaze calibration.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Pt2`, `Vec2`, `Mat3`, ...),
//! - pinhole intrinsics and lens distortion models,
//! - [`CameraIntrinsics`], the immutable scene-camera description loaded once
//!   at startup, and the undistortion entry points built on it,
//! - screen-space geometry used by cursor clamping and dwell regions.
//!
//! Pixel pipeline of the scene camera:
//! `pixel = K ∘ distortion(normalized)`
//!
//! Undistortion inverts it: `K ∘ undistort ∘ K⁻¹ (pixel)`, re-projecting the
//! corrected normalized coordinate through the same `K`.

/// Immutable scene-camera description and its JSON loader.
pub mod camera;
/// Screen bounds and dwell regions.
pub mod geometry;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Intrinsics and distortion models.
pub mod models;
/// Pixel/normalized conversions and undistortion.
pub mod undistort;

pub use camera::*;
pub use geometry::*;
pub use math::*;
pub use models::*;
pub use undistort::*;
