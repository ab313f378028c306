//! Per-frame data: decoded raster images and the keypoints found in them.

use serde::{Deserialize, Serialize};

use crate::joint::Joint;

/// Keypoints scoring at or below this value are treated as absent for geometry.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;

/// Pixel layout of a [`RasterFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit RGBA, tightly packed rows.
    Rgba8,
    /// 8-bit RGB, tightly packed rows.
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// A decoded video frame captured right after a completed seek.
#[derive(Clone, PartialEq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Presentation timestamp reported by the decoder, if any.
    pub pts_secs: Option<f64>,
    pub data: Vec<u8>,
}

impl RasterFrame {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            pts_secs: None,
            data,
        }
    }

    /// A black frame, handy for tests and synthetic sources.
    pub fn blank(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * PixelFormat::Rgba8.bytes_per_pixel();
        Self::new(width, height, PixelFormat::Rgba8, vec![0; len])
    }

    pub fn with_pts(mut self, pts_secs: f64) -> Self {
        self.pts_secs = Some(pts_secs);
        self
    }

    /// Whether the buffer length matches the declared geometry.
    pub fn is_well_formed(&self) -> bool {
        self.data.len()
            == self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

impl std::fmt::Debug for RasterFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("pts_secs", &self.pts_secs)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A named joint position in pixel coordinates with its detection confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub joint: Joint,
    /// Pixel column.
    pub x: f64,
    /// Pixel row (grows downward).
    pub y: f64,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

impl Keypoint {
    pub fn new(joint: Joint, x: f64, y: f64, score: f64) -> Self {
        Self { joint, x, y, score }
    }

    /// Whether this keypoint is usable for geometry under the presence rule.
    pub fn is_present(&self, min_score: f64) -> bool {
        self.score > min_score
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// The keypoints extracted from one sampled frame.
///
/// Low-confidence keypoints are kept here for inspection; the presence rule
/// is applied by the accessors used for geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// 0-based ordinal in the sampled sequence.
    pub index: usize,
    pub timestamp_secs: f64,
    /// Whether the pose source found a subject at all.
    pub subject_detected: bool,
    /// At most one keypoint per joint.
    pub keypoints: Vec<Keypoint>,
}

impl PoseFrame {
    /// A frame in which the pose source found nobody: every joint is absent.
    pub fn missing(index: usize, timestamp_secs: f64) -> Self {
        Self {
            index,
            timestamp_secs,
            subject_detected: false,
            keypoints: Vec::new(),
        }
    }

    /// Raw keypoint for `joint`, regardless of its score.
    pub fn keypoint(&self, joint: Joint) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.joint == joint)
    }

    /// Score of `joint`, `0.0` when it was not detected.
    pub fn score(&self, joint: Joint) -> f64 {
        self.keypoint(joint).map(|kp| kp.score).unwrap_or(0.0)
    }

    /// Keypoint for `joint` if it passes the presence rule (`score > min_score`).
    pub fn present(&self, joint: Joint, min_score: f64) -> Option<&Keypoint> {
        self.keypoint(joint).filter(|kp| kp.is_present(min_score))
    }

    /// Number of keypoints passing the presence rule.
    pub fn present_count(&self, min_score: f64) -> usize {
        self.keypoints
            .iter()
            .filter(|kp| kp.is_present(min_score))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> PoseFrame {
        PoseFrame {
            index: 4,
            timestamp_secs: 0.16,
            subject_detected: true,
            keypoints: vec![
                Keypoint::new(Joint::LeftAnkle, 120.0, 410.0, 0.92),
                Keypoint::new(Joint::LeftKnee, 118.0, 330.0, 0.3),
                Keypoint::new(Joint::LeftHip, 115.0, 250.0, 0.05),
            ],
        }
    }

    #[test]
    fn test_presence_rule_is_strict() {
        let frame = sample_frame();
        assert!(frame.present(Joint::LeftAnkle, DEFAULT_MIN_CONFIDENCE).is_some());
        // exactly 0.3 is not present
        assert!(frame.present(Joint::LeftKnee, DEFAULT_MIN_CONFIDENCE).is_none());
        assert!(frame.present(Joint::LeftHip, DEFAULT_MIN_CONFIDENCE).is_none());
        assert_eq!(frame.present_count(DEFAULT_MIN_CONFIDENCE), 1);
    }

    #[test]
    fn test_low_confidence_keypoints_stay_inspectable() {
        let frame = sample_frame();
        let hip = frame.keypoint(Joint::LeftHip).unwrap();
        assert_eq!(hip.position(), (115.0, 250.0));
        assert_eq!(frame.score(Joint::LeftHip), 0.05);
    }

    #[test]
    fn test_missing_frame_has_zero_scores() {
        let frame = PoseFrame::missing(2, 0.08);
        assert!(!frame.subject_detected);
        for joint in Joint::ALL {
            assert_eq!(frame.score(joint), 0.0);
            assert!(frame.keypoint(joint).is_none());
        }
    }

    #[test]
    fn test_blank_raster_is_well_formed() {
        let frame = RasterFrame::blank(4, 3).with_pts(1.5);
        assert!(frame.is_well_formed());
        assert_eq!(frame.data.len(), 48);
        assert_eq!(frame.pts_secs, Some(1.5));
        assert!(format!("{frame:?}").contains("bytes: 48"));
    }
}
