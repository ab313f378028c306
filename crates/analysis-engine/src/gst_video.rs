//! GStreamer-backed video surface.
//!
//! The file is decoded by a paused pipeline ending in a `fakesink` that
//! keeps its last buffer. A flushing, accurate seek re-prerolls the sink,
//! and waiting for the pipeline state afterwards blocks until the frame at
//! the new position has arrived. The prerolled buffer is what
//! `current_frame` returns, so a capture can never see a stale frame.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use gst::prelude::*;
use gstreamer as gst;
use sportcv_common::clock::SamplingPlan;
use sportcv_common::error::{SportcvError, SportcvResult};
use sportcv_pose_model::frame::{PixelFormat, RasterFrame};

use crate::video::VideoSurface;

/// How long a state change (open or seek) may take before the video is
/// considered unreadable.
const STATE_TIMEOUT_SECS: u64 = 10;

/// Elements the decode pipeline needs.
const REQUIRED_ELEMENTS: [&str; 5] = [
    "filesrc",
    "decodebin",
    "videoconvert",
    "capsfilter",
    "fakesink",
];

/// A video file opened for frame-accurate seeking.
pub struct GstVideoSurface {
    path: PathBuf,
    pipeline: gst::Pipeline,
    sink: gst::Element,
    duration_secs: f64,
}

impl GstVideoSurface {
    /// Open `path` and preroll the first frame.
    ///
    /// A missing file is `FileNotFound`; undecodable files and files without
    /// a known duration are invalid input.
    pub fn open(path: &Path) -> SportcvResult<Self> {
        if !path.exists() {
            return Err(SportcvError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        init_gstreamer()?;

        let launch = format!(
            "filesrc location=\"{}\" ! decodebin ! videoconvert ! video/x-raw,format=RGBA ! fakesink name=sink enable-last-sample=true sync=false",
            escape_path(path)
        );
        let element = gst::parse::launch(&launch).map_err(|e| {
            SportcvError::invalid_input(format!("Failed to build decode pipeline: {e}"))
        })?;
        let pipeline = element.dynamic_cast::<gst::Pipeline>().map_err(|_| {
            SportcvError::invalid_input("Launch string did not produce a pipeline")
        })?;
        let sink = pipeline
            .by_name("sink")
            .ok_or_else(|| SportcvError::invalid_input("Decode pipeline has no sink"))?;

        pipeline.set_state(gst::State::Paused).map_err(|e| {
            SportcvError::invalid_input(format!(
                "Failed to open {}: {e:?}",
                path.display()
            ))
        })?;
        wait_for_preroll(&pipeline).map_err(|e| {
            let _ = pipeline.set_state(gst::State::Null);
            SportcvError::invalid_input(format!("Unreadable video {}: {e}", path.display()))
        })?;

        let duration_secs = pipeline
            .query_duration::<gst::ClockTime>()
            .map(|d| SamplingPlan::ns_to_secs(d.nseconds()))
            .ok_or_else(|| {
                let _ = pipeline.set_state(gst::State::Null);
                SportcvError::invalid_input(format!(
                    "Could not determine duration of {}",
                    path.display()
                ))
            })?;

        tracing::info!(path = %path.display(), duration_secs, "Opened video");

        Ok(Self {
            path: path.to_path_buf(),
            pipeline,
            sink,
            duration_secs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl VideoSurface for GstVideoSurface {
    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    async fn seek(&mut self, timestamp_secs: f64) -> SportcvResult<()> {
        let pipeline = self.pipeline.clone();
        let position = gst::ClockTime::from_nseconds(SamplingPlan::secs_to_ns(timestamp_secs));

        tokio::task::spawn_blocking(move || {
            pipeline
                .seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE, position)
                .map_err(|e| {
                    SportcvError::video(format!("Seek to {timestamp_secs:.3}s failed: {e}"))
                })?;
            wait_for_preroll(&pipeline).map_err(|e| {
                SportcvError::video(format!("Seek to {timestamp_secs:.3}s did not complete: {e}"))
            })
        })
        .await
        .map_err(|e| SportcvError::video(format!("Seek task failed: {e}")))?
    }

    fn current_frame(&self) -> SportcvResult<RasterFrame> {
        let sample = self
            .sink
            .property::<Option<gst::Sample>>("last-sample")
            .ok_or_else(|| SportcvError::video("No decoded frame available"))?;
        frame_from_sample(&sample)
    }
}

impl Drop for GstVideoSurface {
    fn drop(&mut self) {
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            tracing::warn!(
                path = %self.path.display(),
                "Failed to shut down decode pipeline: {e:?}"
            );
        }
    }
}

/// Availability of one GStreamer element needed for decoding.
#[derive(Debug, Clone)]
pub struct DecoderCapability {
    pub element: &'static str,
    pub available: bool,
}

/// Check that GStreamer initializes and every decode element is installed.
pub fn decoder_capabilities() -> SportcvResult<Vec<DecoderCapability>> {
    init_gstreamer()?;
    Ok(REQUIRED_ELEMENTS
        .iter()
        .map(|&element| DecoderCapability {
            element,
            available: gst::ElementFactory::find(element).is_some(),
        })
        .collect())
}

fn wait_for_preroll(pipeline: &gst::Pipeline) -> Result<(), String> {
    match pipeline.state(gst::ClockTime::from_seconds(STATE_TIMEOUT_SECS)) {
        (Ok(_), gst::State::Paused, _) => Ok(()),
        (Ok(_), state, _) => Err(format!(
            "pipeline reached {state:?} instead of Paused within {STATE_TIMEOUT_SECS}s"
        )),
        (Err(e), _, _) => Err(format!("{e:?}")),
    }
}

fn frame_from_sample(sample: &gst::Sample) -> SportcvResult<RasterFrame> {
    let caps = sample
        .caps()
        .ok_or_else(|| SportcvError::video("Decoded frame has no caps"))?;
    let structure = caps
        .structure(0)
        .ok_or_else(|| SportcvError::video("Decoded frame caps are empty"))?;
    let width = structure
        .get::<i32>("width")
        .map_err(|e| SportcvError::video(format!("Decoded frame has no width: {e}")))?;
    let height = structure
        .get::<i32>("height")
        .map_err(|e| SportcvError::video(format!("Decoded frame has no height: {e}")))?;

    let buffer = sample
        .buffer()
        .ok_or_else(|| SportcvError::video("Decoded frame has no buffer"))?;
    let pts_secs = buffer.pts().map(|pts| SamplingPlan::ns_to_secs(pts.nseconds()));
    let map = buffer
        .map_readable()
        .map_err(|e| SportcvError::video(format!("Failed to map frame buffer: {e}")))?;

    let (width, height) = (width.max(0) as u32, height.max(0) as u32);
    let mut frame = RasterFrame::new(width, height, PixelFormat::Rgba8, map.as_slice().to_vec());
    frame.pts_secs = pts_secs;

    if !frame.is_well_formed() {
        return Err(SportcvError::video(format!(
            "Frame buffer holds {} bytes, expected {}x{} RGBA",
            frame.data.len(),
            width,
            height
        )));
    }

    Ok(frame)
}

fn init_gstreamer() -> SportcvResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(SportcvError::unsupported(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('"', "\\\"")
}
