//! Kinematics engine: pose frames in, per-frame signals out.
//!
//! # Signals
//!
//! For each frame `i`:
//! 1. **Position**: pixel row of the tracked joint, `0` when absent.
//! 2. **Velocity**: `pos[i] - pos[i-1]`, `0` for `i = 0`.
//! 3. **Acceleration**: `vel[i] - vel[i-1]` for `i >= 2`, `0` for `i < 2`
//!    (insufficient history).
//! 4. **Angle**: interior angle at the vertex of a joint triplet, `0` when
//!    any of the three joints is absent.
//!
//! Absence never aborts the computation. The sentinel positions take part
//! in the differences exactly like real positions, so a dropped joint shows
//! up as a large, reproducible spike.

use serde::{Deserialize, Serialize};
use sportcv_pose_model::analysis::KinematicSample;
use sportcv_pose_model::frame::{PoseFrame, DEFAULT_MIN_CONFIDENCE};
use sportcv_pose_model::joint::{Joint, JointTriplet};

use crate::angle::joint_angle;
use crate::smoothing::PositionSmoothing;

/// Configuration for the kinematics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicsConfig {
    /// Joint whose vertical position is differentiated.
    pub tracked_joint: Joint,

    /// Joints whose middle one carries the reported angle.
    pub angle_joints: JointTriplet,

    /// Keypoints at or below this score are absent.
    pub min_confidence: f64,

    /// Applied to the position series before differencing. Off by default.
    pub smoothing: PositionSmoothing,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            tracked_joint: Joint::LeftAnkle,
            angle_joints: JointTriplet::default(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            smoothing: PositionSmoothing::None,
        }
    }
}

/// Converts a pose-frame sequence into kinematic samples.
pub struct KinematicsEngine {
    config: KinematicsConfig,
}

impl KinematicsEngine {
    pub fn new(config: KinematicsConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(KinematicsConfig::default())
    }

    pub fn config(&self) -> &KinematicsConfig {
        &self.config
    }

    /// Derive one sample per frame, in frame order.
    pub fn compute(&self, frames: &[PoseFrame]) -> Vec<KinematicSample> {
        let tracked: Vec<Option<f64>> = frames
            .iter()
            .map(|frame| {
                frame
                    .present(self.config.tracked_joint, self.config.min_confidence)
                    .map(|kp| kp.y)
            })
            .collect();

        let positions = self.config.smoothing.apply(&tracked);
        let velocities = velocity_series(&positions);
        let accelerations = acceleration_series(&velocities);

        let missing = tracked.iter().filter(|p| p.is_none()).count();
        if missing > 0 {
            tracing::debug!(
                joint = %self.config.tracked_joint,
                missing,
                total = frames.len(),
                "Tracked joint absent in some frames; using 0 fallback"
            );
        }

        frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let angle =
                    joint_angle(frame, &self.config.angle_joints, self.config.min_confidence);
                KinematicSample {
                    frame: frame.index,
                    timestamp_secs: frame.timestamp_secs,
                    vertical_position: positions[i],
                    position_present: tracked[i].is_some(),
                    velocity: velocities[i],
                    acceleration: accelerations[i],
                    angle_degrees: angle.unwrap_or(0.0),
                    angle_present: angle.is_some(),
                }
            })
            .collect()
    }
}

/// First difference; element 0 is `0`.
pub fn velocity_series(positions: &[f64]) -> Vec<f64> {
    (0..positions.len())
        .map(|i| if i == 0 { 0.0 } else { positions[i] - positions[i - 1] })
        .collect()
}

/// Difference of velocities; elements 0 and 1 are `0`.
pub fn acceleration_series(velocities: &[f64]) -> Vec<f64> {
    (0..velocities.len())
        .map(|i| {
            if i < 2 {
                0.0
            } else {
                velocities[i] - velocities[i - 1]
            }
        })
        .collect()
}
