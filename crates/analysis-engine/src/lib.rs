//! SportCV Analysis Engine
//!
//! Runs the landing-analysis pipeline over a pre-recorded video. The video
//! decoder and the pose estimator are external collaborators, injected
//! through the [`VideoSurface`] and [`PoseSource`] traits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      Analyzer                         │
//! │  ┌─────────────┐   ┌─────────────────┐               │
//! │  │ FrameSampler│──▶│KeypointExtractor│◀── PoseSource │
//! │  └──────┬──────┘   └────────┬────────┘               │
//! │         │ seek+capture      │ PoseFrame              │
//! │    VideoSurface             ▼                        │
//! │              ┌──────────────────┐  ┌───────────────┐ │
//! │              │ KinematicsEngine │─▶│LandingDetector│ │
//! │              └──────────────────┘  └───────────────┘ │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod extractor;
pub mod gst_video;
pub mod pipeline;
pub mod pose;
pub mod sampler;
pub mod video;

pub use extractor::KeypointExtractor;
pub use gst_video::GstVideoSurface;
pub use pipeline::{analyze, AnalysisProgress, AnalysisRequest, AnalysisStage, Analyzer};
pub use pose::{PoseSource, RecordedPoseSource};
pub use sampler::{FrameSampler, SampledFrame};
pub use video::VideoSurface;
