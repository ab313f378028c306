//! Opt-in smoothing of the vertical-position series.
//!
//! The derivative chain is a raw finite difference by default and is
//! therefore noise-sensitive. Smoothing must be requested explicitly.

use serde::{Deserialize, Serialize};
use sportcv_common::error::{SportcvError, SportcvResult};

/// Available position smoothing algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionSmoothing {
    /// Raw positions (default).
    #[default]
    None,

    /// Exponential Moving Average.
    ///
    /// `strength` is in [0.0, 1.0], where larger values mean more smoothing.
    Ema { strength: f64 },

    /// Centered moving average over a window of N samples.
    MovingAverage { window: usize },
}

impl PositionSmoothing {
    /// Build from a configuration name: `none`, `ema`, or `moving-average`.
    pub fn from_name(name: &str, strength: f64, window: usize) -> SportcvResult<Self> {
        match name.trim() {
            "none" => Ok(Self::None),
            "ema" => Ok(Self::Ema {
                strength: strength.clamp(0.0, 1.0),
            }),
            "moving-average" | "moving_average" => Ok(Self::MovingAverage {
                window: window.max(1),
            }),
            other => Err(SportcvError::config(format!(
                "Unknown smoothing algorithm '{other}' (expected none|ema|moving-average)"
            ))),
        }
    }

    /// Smooth a position series where `None` marks an absent joint.
    ///
    /// Only present positions are smoothed; absent slots never contribute to
    /// their neighbours and come back as the `0` sentinel. The output has the
    /// same length as the input.
    pub fn apply(&self, raw: &[Option<f64>]) -> Vec<f64> {
        match *self {
            Self::None => raw.iter().map(|p| p.unwrap_or(0.0)).collect(),
            Self::Ema { strength } => smooth_ema(raw, strength),
            Self::MovingAverage { window } => smooth_moving_average(raw, window),
        }
    }
}

/// `alpha = 1 - strength`, then `smoothed = alpha * current + (1 - alpha) * previous`.
///
/// The running value starts at the first present position and carries
/// across gaps.
fn smooth_ema(raw: &[Option<f64>], strength: f64) -> Vec<f64> {
    let alpha = (1.0 - strength).clamp(0.0, 1.0);
    let mut prev: Option<f64> = None;

    raw.iter()
        .map(|p| match (*p, prev) {
            (None, _) => 0.0,
            (Some(value), None) => {
                prev = Some(value);
                value
            }
            (Some(value), Some(last)) => {
                let smoothed = alpha * value + (1.0 - alpha) * last;
                prev = Some(smoothed);
                smoothed
            }
        })
        .collect()
}

fn smooth_moving_average(raw: &[Option<f64>], window: usize) -> Vec<f64> {
    let half = window.max(1) / 2;

    (0..raw.len())
        .map(|i| {
            if raw[i].is_none() {
                return 0.0;
            }
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(raw.len());
            let (sum, count) = raw[start..end]
                .iter()
                .flatten()
                .copied()
                .fold((0.0_f64, 0usize), |(sum, n), y| (sum + y, n + 1));
            sum / count as f64
        })
        .collect()
}
