//! Derived per-frame signals, landing events, and the result of one run.
//!
//! Missing measurements are reported with a numeric `0` sentinel in the
//! value field *and* a `*_present` flag. Downstream consumers that only read
//! the numbers get the documented fallback; consumers that care about the
//! difference between "0" and "unknown" use the `Option` accessors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::frame::{PoseFrame, RasterFrame};
use crate::joint::{Joint, JointTriplet};

/// Kinematic signals derived for one sampled frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicSample {
    /// Index of the [`PoseFrame`] this sample was derived from.
    pub frame: usize,
    pub timestamp_secs: f64,
    /// Pixel row of the tracked joint, `0.0` when the joint is absent.
    pub vertical_position: f64,
    pub position_present: bool,
    /// First difference of `vertical_position`; `0.0` for frame 0.
    pub velocity: f64,
    /// Second difference of `vertical_position`; `0.0` for frames 0 and 1.
    pub acceleration: f64,
    /// Interior angle at the vertex joint in `[0, 180]`.
    ///
    /// `0.0` is a sentinel meaning "one of the three joints was absent",
    /// not a fully folded joint. Check `angle_present` or [`Self::angle`].
    pub angle_degrees: f64,
    pub angle_present: bool,
}

impl KinematicSample {
    /// Tracked-joint row, or `None` when the joint was absent.
    pub fn position(&self) -> Option<f64> {
        self.position_present.then_some(self.vertical_position)
    }

    /// Joint angle, or `None` when the sentinel is in use.
    pub fn angle(&self) -> Option<f64> {
        self.angle_present.then_some(self.angle_degrees)
    }

    /// Magnitude used for peak detection.
    pub fn acceleration_magnitude(&self) -> f64 {
        self.acceleration.abs()
    }
}

/// A frame flagged as a probable ground impact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingEvent {
    pub frame: usize,
    pub timestamp_secs: f64,
    pub acceleration_magnitude: f64,
    /// Joint angle at impact; `0.0` sentinel when unavailable.
    pub angle_degrees: f64,
    pub angle_present: bool,
    /// The captured image of the flagged frame. Not serialized.
    #[serde(skip)]
    pub source_image: Option<Arc<RasterFrame>>,
}

impl LandingEvent {
    pub fn angle(&self) -> Option<f64> {
        self.angle_present.then_some(self.angle_degrees)
    }
}

impl PartialEq for LandingEvent {
    fn eq(&self, other: &Self) -> bool {
        let same_image = match (&self.source_image, &other.source_image) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a == b,
            (None, None) => true,
            _ => false,
        };
        self.frame == other.frame
            && self.timestamp_secs == other.timestamp_secs
            && self.acceleration_magnitude == other.acceleration_magnitude
            && self.angle_degrees == other.angle_degrees
            && self.angle_present == other.angle_present
            && same_image
    }
}

/// Run-level facts reported next to the signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub fps: u32,
    pub duration_secs: f64,
    pub tracked_joint: Joint,
    pub angle_joints: JointTriplet,
    pub threshold: f64,
    pub frames_sampled: usize,
    pub frames_with_subject: usize,
    pub event_count: usize,
    /// RFC 3339 wall-clock start of the run.
    pub started_at: String,
    pub elapsed_ms: u64,
}

/// Everything one analysis run produced, held in memory only.
///
/// `frames`, `samples` and the candidate index space share the same length
/// and ordering; every event's `frame` indexes into `samples`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: AnalysisSummary,
    pub frames: Vec<PoseFrame>,
    pub samples: Vec<KinematicSample>,
    pub events: Vec<LandingEvent>,
}

impl AnalysisResult {
    /// Sample a landing event refers to.
    pub fn sample_for(&self, event: &LandingEvent) -> Option<&KinematicSample> {
        self.samples.get(event.frame)
    }

    /// Pretty JSON report. Images are omitted.
    pub fn to_json_report(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
