//! Show video duration and the sampling plan.

use std::path::PathBuf;

use sportcv_analysis_engine::gst_video::GstVideoSurface;
use sportcv_analysis_engine::sampler::plan_sampling;
use sportcv_analysis_engine::video::VideoSurface;
use sportcv_common::config::AppConfig;

pub fn run(path: PathBuf, fps: u32, config: &AppConfig) -> anyhow::Result<()> {
    let video =
        GstVideoSurface::open(&path).map_err(|e| anyhow::anyhow!("Failed to open video: {e}"))?;
    let duration = video.duration_secs();

    println!("Video: {}", video.path().display());
    println!("  Duration: {duration:.3}s");

    let min_duration = config.analysis.min_duration_secs;
    match plan_sampling(duration, fps, min_duration) {
        Ok(plan) => {
            println!("  Sampling: {} fps, every {:.3}s", plan.fps(), plan.interval_secs());
            println!("  Planned frames: {}", plan.frame_count());
            if let Some((last, t)) = plan.timestamps().last() {
                println!("  Last sample: frame {last} at {t:.3}s");
            }
        }
        Err(e) => {
            println!("  Not analyzable: {e}");
        }
    }

    Ok(())
}
