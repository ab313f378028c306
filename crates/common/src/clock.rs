//! Sampling and timing utilities.
//!
//! A video is probed at a fixed rate that is independent of its native
//! frame rate. This module provides:
//! - The sampling plan (which timestamps get probed)
//! - A run timer for reporting when and how long an analysis ran
//! - Second/nanosecond conversions for media APIs

use std::time::Instant;

/// Tolerance used when deciding whether `duration * fps` lands on a whole frame.
const FRAME_EPSILON: f64 = 1e-9;

/// The fixed-rate sampling schedule over a video's time domain.
///
/// Sample `i` sits at `t_i = i / fps` and exists while `t_i < duration`.
/// The sequence is finite and every call to [`SamplingPlan::timestamps`]
/// starts over from the first sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPlan {
    fps: u32,
    duration_secs: f64,
}

impl SamplingPlan {
    pub fn new(fps: u32, duration_secs: f64) -> Self {
        Self { fps, duration_secs }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Spacing between consecutive samples in seconds.
    pub fn interval_secs(&self) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        1.0 / self.fps as f64
    }

    /// Timestamp of sample `index` in seconds.
    pub fn timestamp(&self, index: usize) -> f64 {
        if self.fps == 0 {
            return 0.0;
        }
        index as f64 / self.fps as f64
    }

    /// Number of samples with `t_i < duration`.
    ///
    /// Equals `floor(duration * fps)` whenever the product is whole; otherwise
    /// the last sample is the truncated one just before the end.
    pub fn frame_count(&self) -> usize {
        if self.fps == 0 || !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return 0;
        }

        let limit = self.duration_secs * self.fps as f64;
        let nearest = limit.round();
        if (limit - nearest).abs() < FRAME_EPSILON {
            nearest as usize
        } else {
            limit.ceil() as usize
        }
    }

    /// Lazy iterator over `(index, timestamp_secs)` pairs.
    pub fn timestamps(&self) -> impl Iterator<Item = (usize, f64)> {
        let plan = *self;
        (0..plan.frame_count()).map(move |i| (i, plan.timestamp(i)))
    }

    /// Convert seconds to nanoseconds.
    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs.max(0.0) * 1_000_000_000.0).round() as u64
    }

    /// Convert nanoseconds to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}

/// Tracks when an analysis run started and how long it has been going.
#[derive(Debug, Clone)]
pub struct RunTimer {
    /// The instant the run started.
    epoch: Instant,

    /// Wall-clock time at start (RFC 3339).
    epoch_wall: String,
}

impl RunTimer {
    /// Create a timer anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Wall-clock time at start.
    pub fn started_at(&self) -> &str {
        &self.epoch_wall
    }

    /// Milliseconds elapsed since start.
    pub fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_whole_duration_frame_count() {
        assert_eq!(SamplingPlan::new(25, 2.0).frame_count(), 50);
        assert_eq!(SamplingPlan::new(25, 1.0).frame_count(), 25);
        assert_eq!(SamplingPlan::new(30, 0.1).frame_count(), 3);
    }

    #[test]
    fn test_truncated_final_sample() {
        // 1.02s * 25 = 25.5 -> samples 0..=25, the last at 1.00s
        let plan = SamplingPlan::new(25, 1.02);
        assert_eq!(plan.frame_count(), 26);
        let last = plan.timestamps().last().unwrap();
        assert_eq!(last.0, 25);
        assert!((last.1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_plans_are_empty() {
        assert_eq!(SamplingPlan::new(0, 5.0).frame_count(), 0);
        assert_eq!(SamplingPlan::new(25, 0.0).frame_count(), 0);
        assert_eq!(SamplingPlan::new(25, -1.0).frame_count(), 0);
        assert_eq!(SamplingPlan::new(25, f64::NAN).frame_count(), 0);
    }

    #[test]
    fn test_timestamps_are_restartable() {
        let plan = SamplingPlan::new(25, 1.0);
        let first: Vec<_> = plan.timestamps().collect();
        let second: Vec<_> = plan.timestamps().collect();
        assert_eq!(first, second);
        assert_eq!(first[1].1, 0.04);
    }

    #[test]
    fn test_ns_conversions() {
        assert_eq!(SamplingPlan::secs_to_ns(0.04), 40_000_000);
        assert!((SamplingPlan::ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_run_timer_elapsed() {
        let timer = RunTimer::start();
        assert!(timer.elapsed_ms() < 1_000);
        assert!(!timer.started_at().is_empty());
    }

    proptest! {
        #[test]
        fn prop_frame_count_matches_floor_for_whole_frames(frames in 1usize..5_000, fps in 1u32..120) {
            let duration = frames as f64 / fps as f64;
            prop_assert_eq!(SamplingPlan::new(fps, duration).frame_count(), frames);
        }

        #[test]
        fn prop_timestamps_strictly_increase_below_duration(duration in 0.01f64..60.0, fps in 1u32..120) {
            let plan = SamplingPlan::new(fps, duration);
            let stamps: Vec<f64> = plan.timestamps().map(|(_, t)| t).collect();
            for pair in stamps.windows(2) {
                prop_assert!(pair[1] > pair[0]);
            }
            if let Some(last) = stamps.last() {
                prop_assert!(*last < duration + FRAME_EPSILON);
            }
        }
    }
}
