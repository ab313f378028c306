//! Error types shared across SportCV crates.

use std::path::PathBuf;

/// Top-level error type for SportCV operations.
#[derive(Debug, thiserror::Error)]
pub enum SportcvError {
    /// The input video cannot be analyzed (too short, unreadable, bad sampling rate).
    /// Raised before any frame is sampled.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The pose source itself failed. Fatal to the current run.
    #[error("Pose source failure: {message}")]
    PoseSource { message: String },

    /// Seeking or capturing from the video surface failed.
    #[error("Video error: {message}")]
    Video { message: String },

    /// The run was cancelled; partial results were discarded.
    #[error("Analysis cancelled after {frames_done} of {total_frames} frames")]
    Cancelled {
        frames_done: usize,
        total_frames: usize,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SportcvError.
pub type SportcvResult<T> = Result<T, SportcvError>;

impl SportcvError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn pose_source(msg: impl Into<String>) -> Self {
        Self::PoseSource {
            message: msg.into(),
        }
    }

    pub fn video(msg: impl Into<String>) -> Self {
        Self::Video {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error was raised by input validation, before sampling.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
