//! The pose source contract and a replaying implementation.

use std::collections::HashMap;
use std::path::Path;

use sportcv_common::error::{SportcvError, SportcvResult};
use sportcv_pose_model::frame::RasterFrame;
use sportcv_pose_model::recording::{parse_pose_records, DetectedPose, PoseRecord};

/// A pose estimator.
///
/// Returns every subject found in the frame, or an empty list when nobody
/// was detected (a miss, not an error). An `Err` means the estimator itself
/// failed and aborts the run. At most one call is in flight at a time.
#[async_trait::async_trait]
pub trait PoseSource: Send {
    async fn estimate(&mut self, frame: &RasterFrame) -> SportcvResult<Vec<DetectedPose>>;
}

#[async_trait::async_trait]
impl<P: PoseSource + ?Sized> PoseSource for Box<P> {
    async fn estimate(&mut self, frame: &RasterFrame) -> SportcvResult<Vec<DetectedPose>> {
        (**self).estimate(frame).await
    }
}

/// Replays recorded estimator output.
///
/// The `n`-th call to `estimate` returns the record for frame `n`; frames
/// without a record are misses. Estimation order equals sampling order, so
/// the call ordinal is the frame index.
#[derive(Debug, Clone, Default)]
pub struct RecordedPoseSource {
    records: HashMap<usize, Vec<DetectedPose>>,
    cursor: usize,
}

impl RecordedPoseSource {
    pub fn new(records: Vec<PoseRecord>) -> Self {
        let mut by_frame = HashMap::with_capacity(records.len());
        for record in records {
            if by_frame.insert(record.frame, record.poses).is_some() {
                tracing::warn!(frame = record.frame, "Duplicate pose record; keeping the last one");
            }
        }
        Self {
            records: by_frame,
            cursor: 0,
        }
    }

    /// Load a recorded-pose JSONL file.
    pub fn from_jsonl_file(path: &Path) -> SportcvResult<Self> {
        if !path.exists() {
            return Err(SportcvError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let records = parse_pose_records(&content).map_err(|e| {
            SportcvError::invalid_input(format!(
                "Failed to parse pose records in {}: {e}",
                path.display()
            ))
        })?;
        tracing::info!(path = %path.display(), records = records.len(), "Loaded recorded poses");
        Ok(Self::new(records))
    }

    /// Number of frames that have a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Start replaying from frame 0 again.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

#[async_trait::async_trait]
impl PoseSource for RecordedPoseSource {
    async fn estimate(&mut self, _frame: &RasterFrame) -> SportcvResult<Vec<DetectedPose>> {
        let poses = self.records.get(&self.cursor).cloned().unwrap_or_default();
        self.cursor += 1;
        Ok(poses)
    }
}
