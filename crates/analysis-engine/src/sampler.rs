//! Frame sampler: walks a video at a fixed rate.

use std::sync::Arc;

use sportcv_common::clock::SamplingPlan;
use sportcv_common::error::{SportcvError, SportcvResult};
use sportcv_pose_model::frame::RasterFrame;

use crate::video::VideoSurface;

/// Default sampling rate (frames per second).
pub const DEFAULT_FPS: u32 = 25;

/// Videos shorter than this are rejected by default.
pub const DEFAULT_MIN_DURATION_SECS: f64 = 1.0;

/// One captured sample.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub index: usize,
    pub timestamp_secs: f64,
    pub image: Arc<RasterFrame>,
}

/// Validate a video and build its sampling plan.
///
/// Fails with `InvalidInput` before anything is sampled when the rate is
/// zero or the duration is unknown or below `min_duration_secs`.
pub fn plan_sampling(
    duration_secs: f64,
    fps: u32,
    min_duration_secs: f64,
) -> SportcvResult<SamplingPlan> {
    if fps == 0 {
        return Err(SportcvError::invalid_input("Sampling rate must be at least 1 fps"));
    }
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(SportcvError::invalid_input(format!(
            "Video duration is not usable: {duration_secs}"
        )));
    }
    if duration_secs < min_duration_secs {
        return Err(SportcvError::invalid_input(format!(
            "Video is {duration_secs:.2}s long; at least {min_duration_secs:.2}s is required"
        )));
    }
    Ok(SamplingPlan::new(fps, duration_secs))
}

/// Lazily seeks and captures one frame per planned timestamp.
///
/// Each [`FrameSampler::next_frame`] call issues one seek, waits for it,
/// then captures; the next seek is only issued by the next call. The
/// sequence can be restarted with [`FrameSampler::restart`].
pub struct FrameSampler<'a, V: VideoSurface + ?Sized> {
    video: &'a mut V,
    plan: SamplingPlan,
    next_index: usize,
}

impl<'a, V: VideoSurface + ?Sized> FrameSampler<'a, V> {
    /// Validate `video` and prepare to sample it. No seek happens here.
    pub fn new(video: &'a mut V, fps: u32, min_duration_secs: f64) -> SportcvResult<Self> {
        let plan = plan_sampling(video.duration_secs(), fps, min_duration_secs)?;
        Ok(Self {
            video,
            plan,
            next_index: 0,
        })
    }

    pub fn plan(&self) -> &SamplingPlan {
        &self.plan
    }

    /// Total number of samples in the sequence.
    pub fn len(&self) -> usize {
        self.plan.frame_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples taken so far since the last restart.
    pub fn position(&self) -> usize {
        self.next_index
    }

    /// Seek to the next timestamp and capture it, or `None` past the end.
    pub async fn next_frame(&mut self) -> SportcvResult<Option<SampledFrame>> {
        if self.next_index >= self.plan.frame_count() {
            return Ok(None);
        }

        let index = self.next_index;
        let timestamp_secs = self.plan.timestamp(index);

        self.video.seek(timestamp_secs).await?;
        let image = self.video.current_frame()?;
        self.next_index += 1;

        Ok(Some(SampledFrame {
            index,
            timestamp_secs,
            image: Arc::new(image),
        }))
    }

    /// Start again from the first timestamp.
    pub fn restart(&mut self) {
        self.next_index = 0;
    }
}
