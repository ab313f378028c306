//! Pose estimator output and its recorded JSONL form.
//!
//! A pose estimator returns zero or more detected people per frame, each
//! with free-form keypoint names. Recordings store that raw output one
//! frame per line so analyses can be replayed without running a model:
//!
//! ```text
//! # recorded by movenet-lightning
//! {"frame":0,"poses":[{"keypoints":[{"name":"left_ankle","x":312.0,"y":640.5,"score":0.91}]}]}
//! {"frame":1,"poses":[]}
//! ```
//!
//! Frames without a line are treated like `"poses":[]` (no subject).

use serde::{Deserialize, Serialize};

/// One keypoint as emitted by a pose estimator, before vocabulary filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawKeypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub score: f64,
}

impl RawKeypoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64, score: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score,
        }
    }
}

/// One detected subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedPose {
    pub keypoints: Vec<RawKeypoint>,
}

impl DetectedPose {
    pub fn new(keypoints: Vec<RawKeypoint>) -> Self {
        Self { keypoints }
    }
}

/// Recorded estimator output for one sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    pub frame: usize,
    #[serde(default)]
    pub poses: Vec<DetectedPose>,
}

/// Parse pose records from JSONL content (one JSON object per line).
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_pose_records(jsonl: &str) -> Result<Vec<PoseRecord>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
