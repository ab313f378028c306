//! SportCV Processing Core
//!
//! Turns pose sequences into motion signals and landing events:
//! - **Kinematics:** vertical position, velocity, and acceleration by finite difference
//! - **Angles:** three-point interior joint angle
//! - **Smoothing:** opt-in position smoothing (off by default)
//! - **Detection:** thresholded local maxima of acceleration magnitude
//!
//! This crate is pure computation with no I/O and no media or model dependencies.
//! All inputs are data; all outputs are data.

pub mod angle;
pub mod detector;
pub mod kinematics;
pub mod smoothing;

pub use detector::LandingDetector;
pub use kinematics::{KinematicsConfig, KinematicsEngine};
pub use smoothing::PositionSmoothing;
