//! Keypoint extractor: pose-source output projected onto the joint vocabulary.

use sportcv_common::error::SportcvResult;
use sportcv_pose_model::frame::{Keypoint, PoseFrame};
use sportcv_pose_model::joint::Joint;
use sportcv_pose_model::recording::DetectedPose;

use crate::pose::PoseSource;
use crate::sampler::SampledFrame;

/// Keeps only the joints of interest from the first detected subject.
#[derive(Debug, Clone)]
pub struct KeypointExtractor {
    joints_of_interest: Vec<Joint>,
}

impl KeypointExtractor {
    pub fn new(joints_of_interest: Vec<Joint>) -> Self {
        Self { joints_of_interest }
    }

    /// Track every joint in the vocabulary.
    pub fn all_joints() -> Self {
        Self::new(Joint::ALL.to_vec())
    }

    pub fn joints_of_interest(&self) -> &[Joint] {
        &self.joints_of_interest
    }

    /// Run the pose source once on `sample` and project the result.
    ///
    /// A source error is returned as-is; an empty result becomes a frame
    /// with every joint absent.
    pub async fn extract<P: PoseSource + ?Sized>(
        &self,
        source: &mut P,
        sample: &SampledFrame,
    ) -> SportcvResult<PoseFrame> {
        let poses = source.estimate(&sample.image).await?;
        let frame = self.project(sample.index, sample.timestamp_secs, &poses);

        if !frame.subject_detected {
            tracing::debug!(frame = sample.index, "No subject detected");
        } else if poses.len() > 1 {
            tracing::debug!(
                frame = sample.index,
                subjects = poses.len(),
                "Multiple subjects detected; using the first"
            );
        }

        Ok(frame)
    }

    /// Project estimator output onto the joints of interest.
    ///
    /// Only the first subject is used. Names outside the vocabulary or not of
    /// interest are dropped, and the first occurrence of a repeated name
    /// wins. Low-confidence keypoints are kept.
    pub fn project(&self, index: usize, timestamp_secs: f64, poses: &[DetectedPose]) -> PoseFrame {
        let Some(subject) = poses.first() else {
            return PoseFrame::missing(index, timestamp_secs);
        };

        let mut keypoints: Vec<Keypoint> = Vec::with_capacity(self.joints_of_interest.len());
        for raw in &subject.keypoints {
            let Some(joint) = Joint::from_name(&raw.name) else {
                continue;
            };
            if !self.joints_of_interest.contains(&joint) {
                continue;
            }
            if keypoints.iter().any(|kp| kp.joint == joint) {
                continue;
            }
            keypoints.push(Keypoint::new(joint, raw.x, raw.y, raw.score));
        }

        PoseFrame {
            index,
            timestamp_secs,
            subject_detected: true,
            keypoints,
        }
    }
}

impl Default for KeypointExtractor {
    fn default() -> Self {
        Self::all_joints()
    }
}
