//! The video surface contract.

use sportcv_common::error::SportcvResult;
use sportcv_pose_model::frame::RasterFrame;

/// A seekable decoded video with a single current position.
///
/// Seeking is destructive: there is one playhead, so callers must never
/// interleave two seek/capture pairs.
#[async_trait::async_trait]
pub trait VideoSurface: Send {
    /// Total duration in seconds.
    fn duration_secs(&self) -> f64;

    /// Move the playhead to `timestamp_secs` and wait until the frame at that
    /// position is decoded.
    async fn seek(&mut self, timestamp_secs: f64) -> SportcvResult<()>;

    /// The frame at the most recently completed seek.
    fn current_frame(&self) -> SportcvResult<RasterFrame>;
}

#[async_trait::async_trait]
impl<V: VideoSurface + ?Sized> VideoSurface for Box<V> {
    fn duration_secs(&self) -> f64 {
        (**self).duration_secs()
    }

    async fn seek(&mut self, timestamp_secs: f64) -> SportcvResult<()> {
        (**self).seek(timestamp_secs).await
    }

    fn current_frame(&self) -> SportcvResult<RasterFrame> {
        (**self).current_frame()
    }
}
