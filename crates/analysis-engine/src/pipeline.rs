//! The end-to-end analysis run.
//!
//! Frame Sampler → Keypoint Extractor → Kinematics Engine → Landing
//! Detector, in one linear pass. Seek, capture and pose inference for frame
//! `i + 1` never start before frame `i` is done. Any failure or a
//! cancellation discards everything collected so far: a run either returns
//! a complete result or an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sportcv_common::clock::RunTimer;
use sportcv_common::config::AnalysisDefaults;
use sportcv_common::error::{SportcvError, SportcvResult};
use sportcv_pose_model::analysis::{AnalysisResult, AnalysisSummary};
use sportcv_pose_model::frame::{PoseFrame, DEFAULT_MIN_CONFIDENCE};
use sportcv_pose_model::joint::{Joint, JointTriplet, Limb, Side};
use sportcv_processing_core::detector::{LandingDetector, DEFAULT_LANDING_THRESHOLD};
use sportcv_processing_core::kinematics::{KinematicsConfig, KinematicsEngine};
use sportcv_processing_core::smoothing::PositionSmoothing;

use crate::extractor::KeypointExtractor;
use crate::pose::PoseSource;
use crate::sampler::{FrameSampler, DEFAULT_FPS, DEFAULT_MIN_DURATION_SECS};
use crate::video::VideoSurface;

/// Parameters of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Sampling rate in frames per second.
    pub fps: u32,

    /// Joint whose vertical position is differentiated.
    pub tracked_joint: Joint,

    /// Joints whose middle one carries the reported angle.
    pub angle_joints: JointTriplet,

    /// Peak threshold on acceleration magnitude.
    pub threshold: f64,

    /// Shorter videos are rejected before sampling.
    pub min_duration_secs: f64,

    /// Presence rule: keypoints must score strictly above this.
    pub min_confidence: f64,

    /// Joints kept from the pose source output.
    pub joints_of_interest: Vec<Joint>,

    /// Opt-in smoothing of the position series.
    pub smoothing: PositionSmoothing,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            tracked_joint: Joint::LeftAnkle,
            angle_joints: JointTriplet::leg(Side::Left),
            threshold: DEFAULT_LANDING_THRESHOLD,
            min_duration_secs: DEFAULT_MIN_DURATION_SECS,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            joints_of_interest: Joint::ALL.to_vec(),
            smoothing: PositionSmoothing::None,
        }
    }
}

impl AnalysisRequest {
    /// Build a request from configured defaults.
    pub fn from_defaults(defaults: &AnalysisDefaults) -> SportcvResult<Self> {
        let tracked_joint: Joint = defaults
            .tracked_joint
            .parse()
            .map_err(|e| SportcvError::config(format!("{e}")))?;
        let side: Side = defaults
            .side
            .parse()
            .map_err(|_| SportcvError::config(format!("Unknown side '{}'", defaults.side)))?;
        let limb: Limb = defaults
            .limb
            .parse()
            .map_err(|_| SportcvError::config(format!("Unknown limb '{}'", defaults.limb)))?;
        let smoothing = PositionSmoothing::from_name(&defaults.smoothing, 0.3, 3)?;

        Ok(Self {
            fps: defaults.fps,
            tracked_joint,
            angle_joints: JointTriplet::limb(limb, side),
            threshold: defaults.threshold,
            min_duration_secs: defaults.min_duration_secs,
            min_confidence: defaults.min_confidence,
            joints_of_interest: Joint::ALL.to_vec(),
            smoothing,
        })
    }

    fn kinematics_config(&self) -> KinematicsConfig {
        KinematicsConfig {
            tracked_joint: self.tracked_joint,
            angle_joints: self.angle_joints,
            min_confidence: self.min_confidence,
            smoothing: self.smoothing,
        }
    }

    /// The extractor must keep the joints the kinematics read, even when the
    /// caller narrowed the joints of interest.
    fn extractor(&self) -> KeypointExtractor {
        let mut joints = self.joints_of_interest.clone();
        for joint in std::iter::once(self.tracked_joint).chain(self.angle_joints.joints()) {
            if !joints.contains(&joint) {
                joints.push(joint);
            }
        }
        KeypointExtractor::new(joints)
    }
}

/// Stages of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Sampling,
    Kinematics,
    Detection,
    Complete,
}

/// Progress report for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisProgress {
    pub frames_done: usize,
    pub total_frames: usize,
    pub stage: AnalysisStage,
}

impl AnalysisProgress {
    /// Progress in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            return if self.stage == AnalysisStage::Complete { 1.0 } else { 0.0 };
        }
        (self.frames_done as f64 / self.total_frames as f64).clamp(0.0, 1.0)
    }
}

/// Progress callback for analysis runs.
pub type ProgressCallback = Box<dyn Fn(AnalysisProgress) + Send + Sync>;

/// Runs analyses with a shared cancellation flag.
pub struct Analyzer {
    request: AnalysisRequest,
    stop_flag: Arc<AtomicBool>,
    progress: Option<ProgressCallback>,
}

impl Analyzer {
    pub fn new(request: AnalysisRequest) -> Self {
        Self {
            request,
            stop_flag: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    /// Flag that cancels the run when set. Checked before every frame.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Analyze `video` using `poses` for keypoints.
    pub async fn run<V, P>(&self, video: &mut V, poses: &mut P) -> SportcvResult<AnalysisResult>
    where
        V: VideoSurface + ?Sized,
        P: PoseSource + ?Sized,
    {
        let timer = RunTimer::start();
        let request = &self.request;

        let mut sampler = FrameSampler::new(video, request.fps, request.min_duration_secs)?;
        let plan = *sampler.plan();
        let total_frames = sampler.len();

        tracing::info!(
            fps = request.fps,
            duration_secs = plan.duration_secs(),
            joint = %request.tracked_joint,
            threshold = request.threshold,
            planned_frames = total_frames,
            "Starting analysis"
        );

        let extractor = request.extractor();
        let mut frames: Vec<PoseFrame> = Vec::with_capacity(total_frames);
        let mut images = Vec::with_capacity(total_frames);

        loop {
            if self.stop_flag.load(Ordering::SeqCst) {
                tracing::warn!(
                    frames_done = frames.len(),
                    total_frames,
                    "Analysis cancelled; discarding partial results"
                );
                return Err(SportcvError::Cancelled {
                    frames_done: frames.len(),
                    total_frames,
                });
            }

            let sample = match sampler.next_frame().await {
                Ok(Some(sample)) => sample,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(frame = frames.len(), error = %e, "Frame capture failed");
                    return Err(e);
                }
            };

            let frame = match extractor.extract(poses, &sample).await {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(frame = sample.index, error = %e, "Pose source failed");
                    return Err(e);
                }
            };

            tracing::debug!(
                frame = frame.index,
                t = frame.timestamp_secs,
                subject = frame.subject_detected,
                present = frame.present_count(request.min_confidence),
                "Sampled frame"
            );

            frames.push(frame);
            images.push(sample.image);
            self.report(frames.len(), total_frames, AnalysisStage::Sampling);
        }

        self.report(frames.len(), total_frames, AnalysisStage::Kinematics);
        let samples = KinematicsEngine::new(request.kinematics_config()).compute(&frames);

        self.report(frames.len(), total_frames, AnalysisStage::Detection);
        let events = LandingDetector::new(request.threshold).detect(&samples, &images);

        let summary = AnalysisSummary {
            fps: request.fps,
            duration_secs: plan.duration_secs(),
            tracked_joint: request.tracked_joint,
            angle_joints: request.angle_joints,
            threshold: request.threshold,
            frames_sampled: frames.len(),
            frames_with_subject: frames.iter().filter(|f| f.subject_detected).count(),
            event_count: events.len(),
            started_at: timer.started_at().to_string(),
            elapsed_ms: timer.elapsed_ms(),
        };

        tracing::info!(
            samples = samples.len(),
            events = events.len(),
            elapsed_ms = summary.elapsed_ms,
            "Analysis complete"
        );
        self.report(frames.len(), total_frames, AnalysisStage::Complete);

        Ok(AnalysisResult {
            summary,
            frames,
            samples,
            events,
        })
    }

    fn report(&self, frames_done: usize, total_frames: usize, stage: AnalysisStage) {
        if let Some(cb) = &self.progress {
            cb(AnalysisProgress {
                frames_done,
                total_frames,
                stage,
            });
        }
    }
}

/// Analyze `video` with `poses` in a single uncancellable run.
///
/// This is the main entry point for callers that do not need progress or
/// cancellation.
pub async fn analyze<V, P>(
    video: &mut V,
    poses: &mut P,
    request: &AnalysisRequest,
) -> SportcvResult<AnalysisResult>
where
    V: VideoSurface + ?Sized,
    P: PoseSource + ?Sized,
{
    Analyzer::new(request.clone()).run(video, poses).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_config_defaults() {
        let request = AnalysisRequest::from_defaults(&AnalysisDefaults::default()).unwrap();
        assert_eq!(request, AnalysisRequest::default());
    }

    #[test]
    fn test_request_from_config_rejects_unknown_joint() {
        let defaults = AnalysisDefaults {
            tracked_joint: "tail".to_string(),
            ..Default::default()
        };
        let err = AnalysisRequest::from_defaults(&defaults).unwrap_err();
        assert!(matches!(err, SportcvError::Config { .. }));
    }

    #[test]
    fn test_request_from_config_uses_arm_limb() {
        let defaults = AnalysisDefaults {
            limb: "arm".to_string(),
            side: "right".to_string(),
            ..Default::default()
        };
        let request = AnalysisRequest::from_defaults(&defaults).unwrap();
        assert_eq!(request.angle_joints, JointTriplet::arm(Side::Right));
        assert_eq!(request.angle_joints.vertex, Joint::RightElbow);
    }

    #[test]
    fn test_extractor_always_keeps_kinematic_joints() {
        let request = AnalysisRequest {
            joints_of_interest: vec![Joint::RightWrist],
            ..Default::default()
        };
        let joints = request.extractor().joints_of_interest().to_vec();
        for joint in [Joint::RightWrist, Joint::LeftAnkle, Joint::LeftKnee, Joint::LeftHip] {
            assert!(joints.contains(&joint));
        }
    }

    #[test]
    fn test_progress_fraction() {
        let progress = AnalysisProgress {
            frames_done: 5,
            total_frames: 20,
            stage: AnalysisStage::Sampling,
        };
        assert_eq!(progress.fraction(), 0.25);
    }
}
