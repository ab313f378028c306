//! Detect landings in a video using recorded pose output.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use sportcv_analysis_engine::gst_video::GstVideoSurface;
use sportcv_analysis_engine::pipeline::{AnalysisRequest, AnalysisStage, Analyzer};
use sportcv_analysis_engine::pose::RecordedPoseSource;
use sportcv_common::config::AppConfig;
use sportcv_pose_model::analysis::AnalysisResult;
use sportcv_pose_model::joint::{Joint, JointTriplet, Limb, Side};
use sportcv_processing_core::smoothing::PositionSmoothing;

/// Flag overrides on top of the configured defaults.
pub struct AnalyzeOptions {
    pub fps: Option<u32>,
    pub joint: Option<String>,
    pub side: Option<String>,
    pub limb: Option<String>,
    pub threshold: Option<f64>,
    pub min_duration: Option<f64>,
    pub smoothing: Option<String>,
    pub smoothing_strength: f64,
    pub smoothing_window: usize,
    pub json: bool,
}

pub async fn run(
    video_path: PathBuf,
    poses_path: PathBuf,
    options: AnalyzeOptions,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let request = build_request(&options, config)?;

    let mut video = GstVideoSurface::open(&video_path)
        .map_err(|e| anyhow::anyhow!("Failed to open video: {e}"))?;
    let mut poses = RecordedPoseSource::from_jsonl_file(&poses_path)
        .map_err(|e| anyhow::anyhow!("Failed to load poses: {e}"))?;

    if !options.json {
        println!("Analyzing: {}", video_path.display());
        println!(
            "  {} fps, joint {}, threshold {}",
            request.fps, request.tracked_joint, request.threshold
        );
    }

    let analyzer = Analyzer::new(request).with_progress(Box::new(|p| {
        if p.stage == AnalysisStage::Sampling && p.frames_done % 25 == 0 {
            tracing::debug!(
                frames_done = p.frames_done,
                total_frames = p.total_frames,
                "Sampling progress: {:.0}%",
                p.fraction() * 100.0
            );
        }
    }));

    let stop_flag = analyzer.stop_flag();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping analysis");
            stop_flag.store(true, Ordering::SeqCst);
        }
    });

    let result = analyzer.run(&mut video, &mut poses).await;
    ctrl_c.abort();
    let result = result.map_err(|e| anyhow::anyhow!("Analysis failed: {e}"))?;

    if options.json {
        println!("{}", result.to_json_report()?);
    } else {
        print_summary(&result);
    }

    Ok(())
}

fn build_request(options: &AnalyzeOptions, config: &AppConfig) -> anyhow::Result<AnalysisRequest> {
    let mut request = AnalysisRequest::from_defaults(&config.analysis)
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    if let Some(fps) = options.fps {
        request.fps = fps;
    }
    if let Some(ref name) = options.joint {
        request.tracked_joint = name.parse::<Joint>()?;
    }
    if options.side.is_some() || options.limb.is_some() {
        let side = options.side.as_deref().unwrap_or(&config.analysis.side);
        let side: Side = side
            .parse()
            .map_err(|_| anyhow::anyhow!("Side must be 'left' or 'right', got '{side}'"))?;
        let limb = options.limb.as_deref().unwrap_or(&config.analysis.limb);
        let limb: Limb = limb
            .parse()
            .map_err(|_| anyhow::anyhow!("Limb must be 'leg' or 'arm', got '{limb}'"))?;
        request.angle_joints = JointTriplet::limb(limb, side);
    }
    if let Some(threshold) = options.threshold {
        request.threshold = threshold;
    }
    if let Some(min_duration) = options.min_duration {
        request.min_duration_secs = min_duration;
    }

    let smoothing_name = options
        .smoothing
        .as_deref()
        .unwrap_or(&config.analysis.smoothing);
    request.smoothing = PositionSmoothing::from_name(
        smoothing_name,
        options.smoothing_strength,
        options.smoothing_window,
    )?;

    Ok(request)
}

fn print_summary(result: &AnalysisResult) {
    let s = &result.summary;
    println!(
        "  Sampled {} frames over {:.2}s ({} with a subject)",
        s.frames_sampled, s.duration_secs, s.frames_with_subject
    );

    if result.events.is_empty() {
        println!("  No landings detected.");
    } else {
        println!("  Landings: {}", result.events.len());
        for event in &result.events {
            let angle = match event.angle() {
                Some(a) => format!("{a:.1}°"),
                None => "n/a".to_string(),
            };
            println!(
                "    frame {:>4}  t={:>6.2}s  |a|={:>7.2}  {} angle {}",
                event.frame,
                event.timestamp_secs,
                event.acceleration_magnitude,
                s.angle_joints.vertex,
                angle
            );
        }
    }

    println!("\nAnalysis complete in {} ms.", s.elapsed_ms);
}
