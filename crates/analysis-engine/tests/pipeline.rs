use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use sportcv_analysis_engine::pipeline::{analyze, AnalysisRequest, AnalysisStage, Analyzer};
use sportcv_analysis_engine::pose::{PoseSource, RecordedPoseSource};
use sportcv_analysis_engine::video::VideoSurface;
use sportcv_common::error::{SportcvError, SportcvResult};
use sportcv_pose_model::frame::RasterFrame;
use sportcv_pose_model::recording::{DetectedPose, PoseRecord, RawKeypoint};

type CallLog = Arc<Mutex<Vec<String>>>;

/// Ankle rows of a countermovement jump at 25 fps; impact lands on frame 16.
const JUMP_ANKLE_ROWS: [f64; 22] = [
    600.0, 600.0, 600.0, 600.0, 600.0, 590.0, 570.0, 540.0, 518.0, 504.0, 498.0, 500.0, 510.0,
    528.0, 554.0, 588.0, 600.0, 600.0, 600.0, 600.0, 600.0, 600.0,
];

struct FakeVideo {
    duration_secs: f64,
    position: f64,
    seeks: usize,
    fail_seek: Option<usize>,
    fail_capture_at: Option<f64>,
    log: CallLog,
}

impl FakeVideo {
    fn new(duration_secs: f64, log: CallLog) -> Self {
        Self {
            duration_secs,
            position: -1.0,
            seeks: 0,
            fail_seek: None,
            fail_capture_at: None,
            log,
        }
    }

    /// The `n`-th seek (zero-based) fails.
    fn failing_seek(mut self, n: usize) -> Self {
        self.fail_seek = Some(n);
        self
    }

    /// Capturing at `timestamp_secs` fails.
    fn failing_capture(mut self, timestamp_secs: f64) -> Self {
        self.fail_capture_at = Some(timestamp_secs);
        self
    }
}

#[async_trait::async_trait]
impl VideoSurface for FakeVideo {
    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    async fn seek(&mut self, timestamp_secs: f64) -> SportcvResult<()> {
        self.log.lock().unwrap().push(format!("seek {timestamp_secs:.2}"));
        let n = self.seeks;
        self.seeks += 1;
        if self.fail_seek == Some(n) {
            return Err(SportcvError::video("decoder lost sync"));
        }
        self.position = timestamp_secs;
        Ok(())
    }

    fn current_frame(&self) -> SportcvResult<RasterFrame> {
        self.log.lock().unwrap().push(format!("capture {:.2}", self.position));
        if self.fail_capture_at == Some(self.position) {
            return Err(SportcvError::video("no decoded frame"));
        }
        Ok(RasterFrame::blank(4, 4).with_pts(self.position))
    }
}

/// Returns a scripted result per call and logs every call.
struct ScriptedPoses {
    script: Vec<SportcvResult<Vec<DetectedPose>>>,
    calls: usize,
    log: CallLog,
}

impl ScriptedPoses {
    fn new(script: Vec<SportcvResult<Vec<DetectedPose>>>, log: CallLog) -> Self {
        Self {
            script,
            calls: 0,
            log,
        }
    }
}

#[async_trait::async_trait]
impl PoseSource for ScriptedPoses {
    async fn estimate(&mut self, frame: &RasterFrame) -> SportcvResult<Vec<DetectedPose>> {
        self.log
            .lock()
            .unwrap()
            .push(format!("estimate {:.2}", frame.pts_secs.unwrap_or(-1.0)));
        let index = self.calls;
        self.calls += 1;
        match self.script.get_mut(index) {
            Some(slot) => std::mem::replace(slot, Ok(Vec::new())),
            None => Ok(Vec::new()),
        }
    }
}

fn leg(ankle_y: f64) -> DetectedPose {
    DetectedPose::new(vec![
        RawKeypoint::new("left_hip", 300.0, 380.0, 0.95),
        RawKeypoint::new("left_knee", 330.0, 490.0, 0.9),
        RawKeypoint::new("left_ankle", 310.0, ankle_y, 0.88),
    ])
}

fn jump_records() -> Vec<PoseRecord> {
    JUMP_ANKLE_ROWS
        .iter()
        .enumerate()
        .map(|(frame, &y)| PoseRecord {
            frame,
            poses: vec![leg(y)],
        })
        .collect()
}

fn short_clip_request() -> AnalysisRequest {
    AnalysisRequest {
        min_duration_secs: 0.5,
        ..Default::default()
    }
}

#[tokio::test]
async fn short_video_is_rejected_before_any_seek() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(0.9, log.clone());
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    let err = analyze(&mut video, &mut poses, &AnalysisRequest::default())
        .await
        .unwrap_err();

    assert!(err.is_invalid_input());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn samples_every_interval_of_the_video() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(2.0, log.clone());
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    let result = analyze(&mut video, &mut poses, &AnalysisRequest::default())
        .await
        .unwrap();

    assert_eq!(result.frames.len(), 50);
    assert_eq!(result.samples.len(), 50);
    assert_eq!(result.summary.frames_sampled, 50);
    for (i, frame) in result.frames.iter().enumerate() {
        assert_eq!(frame.index, i);
        assert!((frame.timestamp_secs - i as f64 / 25.0).abs() < 1e-9);
    }
}

#[tokio::test]
async fn truncated_final_interval_still_sampled() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(1.02, log.clone());
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    let result = analyze(&mut video, &mut poses, &AnalysisRequest::default())
        .await
        .unwrap();

    assert_eq!(result.frames.len(), 26);
    assert!((result.frames[25].timestamp_secs - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn seek_capture_estimate_run_strictly_in_order() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(1.0, log.clone());
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    analyze(&mut video, &mut poses, &AnalysisRequest::default())
        .await
        .unwrap();

    let calls = log.lock().unwrap().clone();
    assert_eq!(calls.len(), 75);
    for (i, chunk) in calls.chunks(3).enumerate() {
        let t = i as f64 / 25.0;
        assert_eq!(chunk[0], format!("seek {t:.2}"));
        assert_eq!(chunk[1], format!("capture {t:.2}"));
        assert_eq!(chunk[2], format!("estimate {t:.2}"));
    }
}

#[tokio::test]
async fn pose_source_failure_aborts_without_partial_results() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(1.0, log.clone());
    let mut poses = ScriptedPoses::new(
        vec![
            Ok(vec![leg(600.0)]),
            Ok(vec![leg(600.0)]),
            Err(SportcvError::pose_source("model crashed")),
        ],
        log.clone(),
    );

    let err = analyze(&mut video, &mut poses, &AnalysisRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SportcvError::PoseSource { .. }));
    let calls = log.lock().unwrap();
    assert_eq!(calls.last().map(String::as_str), Some("estimate 0.08"));
    assert_eq!(calls.len(), 9);
}

#[tokio::test]
async fn stop_flag_cancels_the_run() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(1.0, log.clone());
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    let analyzer = Analyzer::new(AnalysisRequest::default());
    analyzer.stop_flag().store(true, Ordering::SeqCst);

    let err = analyzer.run(&mut video, &mut poses).await.unwrap_err();
    assert!(matches!(
        err,
        SportcvError::Cancelled {
            frames_done: 0,
            total_frames: 25
        }
    ));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stop_flag_set_mid_run_discards_collected_frames() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(1.0, log.clone());
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    let analyzer = Analyzer::new(AnalysisRequest::default());
    let stop = analyzer.stop_flag();
    let analyzer = analyzer.with_progress(Box::new(move |p| {
        if p.stage == AnalysisStage::Sampling && p.frames_done == 3 {
            stop.store(true, Ordering::SeqCst);
        }
    }));

    let err = analyzer.run(&mut video, &mut poses).await.unwrap_err();
    assert!(matches!(
        err,
        SportcvError::Cancelled {
            frames_done: 3,
            total_frames: 25
        }
    ));

    let calls = log.lock().unwrap();
    assert_eq!(calls.len(), 9);
    assert_eq!(calls.last().map(String::as_str), Some("estimate 0.08"));
    assert!(!calls.iter().any(|c| c == "seek 0.12"));
}

#[tokio::test]
async fn seek_failure_is_fatal_and_stops_pose_calls() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(1.0, log.clone()).failing_seek(2);
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    let err = analyze(&mut video, &mut poses, &AnalysisRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SportcvError::Video { .. }));
    let calls = log.lock().unwrap();
    assert_eq!(calls.last().map(String::as_str), Some("seek 0.08"));
    assert_eq!(calls.iter().filter(|c| c.starts_with("estimate")).count(), 2);
    assert_eq!(poses.calls, 2);
}

#[tokio::test]
async fn capture_failure_is_fatal_and_stops_pose_calls() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(1.0, log.clone()).failing_capture(1.0 / 25.0);
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    let err = analyze(&mut video, &mut poses, &AnalysisRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SportcvError::Video { .. }));
    let calls = log.lock().unwrap();
    assert_eq!(calls.last().map(String::as_str), Some("capture 0.04"));
    assert_eq!(poses.calls, 1);
}

#[tokio::test]
async fn recorded_jump_yields_one_landing_with_its_image() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(0.88, log.clone());
    let mut poses = RecordedPoseSource::new(jump_records());

    let result = analyze(&mut video, &mut poses, &short_clip_request())
        .await
        .unwrap();

    assert_eq!(result.samples.len(), 22);
    assert_eq!(result.events.len(), 1);

    let event = &result.events[0];
    assert_eq!(event.frame, 16);
    assert_eq!(event.acceleration_magnitude, 22.0);
    assert!(event.angle().is_some());

    let image = event.source_image.as_ref().expect("landing keeps its frame");
    assert_eq!(image.pts_secs, Some(event.timestamp_secs));
    assert_eq!(result.sample_for(event).map(|s| s.frame), Some(16));
    assert_eq!(result.summary.event_count, 1);
    assert_eq!(result.summary.frames_with_subject, 22);
}

#[tokio::test]
async fn missed_frame_keeps_its_slot_with_sentinels() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(0.88, log.clone());
    let mut records = jump_records();
    records.retain(|r| r.frame != 3);
    let mut poses = RecordedPoseSource::new(records);

    let result = analyze(&mut video, &mut poses, &short_clip_request())
        .await
        .unwrap();

    assert_eq!(result.frames.len(), 22);
    assert!(!result.frames[3].subject_detected);
    assert!(result.frames[3].keypoints.is_empty());

    let sample = &result.samples[3];
    assert!(!sample.position_present);
    assert_eq!(sample.vertical_position, 0.0);
    assert!(!sample.angle_present);
    assert_eq!(sample.angle_degrees, 0.0);
    assert_eq!(result.summary.frames_with_subject, 21);
}

#[tokio::test]
async fn progress_reports_every_stage() {
    let log = CallLog::default();
    let mut video = FakeVideo::new(1.0, log.clone());
    let mut poses = ScriptedPoses::new(Vec::new(), log.clone());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let analyzer = Analyzer::new(AnalysisRequest::default())
        .with_progress(Box::new(move |p| sink.lock().unwrap().push(p)));

    analyzer.run(&mut video, &mut poses).await.unwrap();

    let seen = seen.lock().unwrap();
    let sampling = seen
        .iter()
        .filter(|p| p.stage == AnalysisStage::Sampling)
        .count();
    assert_eq!(sampling, 25);

    let tail: Vec<AnalysisStage> = seen.iter().rev().take(3).rev().map(|p| p.stage).collect();
    assert_eq!(
        tail,
        vec![
            AnalysisStage::Kinematics,
            AnalysisStage::Detection,
            AnalysisStage::Complete
        ]
    );
    assert_eq!(seen.last().map(|p| p.fraction()), Some(1.0));
}
