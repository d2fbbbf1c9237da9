//! Scene-camera model building blocks.
//!
//! The scene camera is modelled in two stages:
//!
//! 1. `DistortionModel`: radial/tangential distortion in normalized space.
//! 2. `PinholeIntrinsics`: map normalized coordinates to pixels (K matrix).
//!
//! The combined mapping is `pixel = K(distortion(normalized))`.

mod distortion;
mod intrinsics;

pub use distortion::*;
pub use intrinsics::*;
