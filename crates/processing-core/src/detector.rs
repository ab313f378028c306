//! Landing detection: local maxima of acceleration magnitude.
//!
//! A sample `i` is a landing when
//! `|a[i]| > threshold && |a[i]| > |a[i-1]| && |a[i]| > |a[i+1]|`.
//! The first and last samples are never interior maxima. Both neighbor
//! comparisons are strict, so a plateau of equal peak values yields no event.
//! Close peaks are neither merged nor deduplicated.

use std::sync::Arc;

use sportcv_pose_model::analysis::{KinematicSample, LandingEvent};
use sportcv_pose_model::frame::RasterFrame;

/// Default peak threshold in px/frame².
pub const DEFAULT_LANDING_THRESHOLD: f64 = 15.0;

/// Local-maximum peak detector over acceleration magnitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingDetector {
    threshold: f64,
}

impl LandingDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_LANDING_THRESHOLD)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `magnitudes[i]` is an interior local maximum above the threshold.
    pub fn is_peak(&self, magnitudes: &[f64], i: usize) -> bool {
        if i == 0 || i + 1 >= magnitudes.len() {
            return false;
        }
        let m = magnitudes[i];
        m > self.threshold && m > magnitudes[i - 1] && m > magnitudes[i + 1]
    }

    /// Indices of all qualifying peaks, ascending.
    pub fn find_peaks(&self, magnitudes: &[f64]) -> Vec<usize> {
        (1..magnitudes.len().saturating_sub(1))
            .filter(|&i| self.is_peak(magnitudes, i))
            .collect()
    }

    /// Flag landing events in `samples`.
    ///
    /// `images[i]` is the captured frame for `samples[i]`; events whose frame
    /// has no image get `source_image: None`.
    pub fn detect(
        &self,
        samples: &[KinematicSample],
        images: &[Arc<RasterFrame>],
    ) -> Vec<LandingEvent> {
        let magnitudes: Vec<f64> = samples
            .iter()
            .map(KinematicSample::acceleration_magnitude)
            .collect();

        let events: Vec<LandingEvent> = self
            .find_peaks(&magnitudes)
            .into_iter()
            .map(|i| {
                let sample = &samples[i];
                LandingEvent {
                    frame: sample.frame,
                    timestamp_secs: sample.timestamp_secs,
                    acceleration_magnitude: magnitudes[i],
                    angle_degrees: sample.angle_degrees,
                    angle_present: sample.angle_present,
                    source_image: images.get(i).cloned(),
                }
            })
            .collect();

        tracing::debug!(
            threshold = self.threshold,
            samples = samples.len(),
            events = events.len(),
            "Landing detection complete"
        );

        events
    }
}

impl Default for LandingDetector {
    fn default() -> Self {
        Self::with_defaults()
    }
}
