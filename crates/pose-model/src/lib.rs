//! SportCV Pose Model
//!
//! Defines the core data contracts for motion analysis:
//! - **Joints:** The fixed vocabulary of tracked anatomical points
//! - **Frames:** Raster images and the keypoints extracted from them
//! - **Analysis:** Kinematic samples, landing events, and run results
//! - **Recording:** Raw pose-estimator output and its JSONL form
//!
//! All coordinates are in pixels of the sampled frame, with `y` growing
//! downward.

pub mod analysis;
pub mod frame;
pub mod joint;
pub mod recording;

pub use analysis::*;
pub use frame::*;
pub use joint::*;
pub use recording::*;
