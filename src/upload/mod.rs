use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::alerts::AlertDispatcher;
use crate::capture::FrameSink;
use crate::collaborators::{ActivityLogClient, MetricsClient, StorageClient};
use crate::events::{EventBus, RecorderEvent};
use crate::models::{CapturedFrame, SessionStats};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// Per-frame pipeline: storage upload, then the metrics fetch for that
/// frame, then alert dispatch. A failed stage stops the frame's pipeline
/// without retrying; nothing here is fatal to the session.
pub struct UploadPipeline {
    session_id: String,
    storage: StorageClient,
    metrics: MetricsClient,
    activity: ActivityLogClient,
    dispatcher: Arc<Mutex<AlertDispatcher>>,
    stats: Arc<SessionStats>,
    events: EventBus,
}

impl UploadPipeline {
    pub fn new(
        session_id: String,
        storage: StorageClient,
        metrics: MetricsClient,
        activity: ActivityLogClient,
        dispatcher: Arc<Mutex<AlertDispatcher>>,
        stats: Arc<SessionStats>,
        events: EventBus,
    ) -> Self {
        Self {
            session_id,
            storage,
            metrics,
            activity,
            dispatcher,
            stats,
            events,
        }
    }

    async fn run(&self, frame: CapturedFrame) {
        let number = frame.number;

        let stored = {
            let storage = self.storage.clone();
            let session_id = self.session_id.clone();
            tokio::task::spawn_blocking(move || storage.save_frame(&session_id, &frame)).await
        };
        let stored = match stored {
            Ok(Ok(stored)) => stored,
            Ok(Err(err)) => return self.record_failure(number, "upload", err),
            Err(err) => return self.record_failure(number, "upload", anyhow!(err)),
        };
        log_info!(
            "frame {number} uploaded as {} ({} bytes)",
            stored.filename,
            stored.size
        );
        // The upload itself succeeded; a metrics failure below is counted
        // separately and does not undo this.
        self.stats.record_uploaded();
        self.events
            .emit(RecorderEvent::StatsUpdated(self.stats.snapshot()));

        let metrics = {
            let client = self.metrics.clone();
            tokio::task::spawn_blocking(move || client.fetch(number)).await
        };
        let metrics = match metrics {
            Ok(Ok(metrics)) => metrics,
            Ok(Err(err)) => return self.record_failure(number, "metrics fetch", err),
            Err(err) => return self.record_failure(number, "metrics fetch", anyhow!(err)),
        };

        // Best-effort posture log; nothing downstream depends on it and a
        // broken logging channel must never break uploads or alerts.
        {
            let activity = self.activity.clone();
            let metrics = metrics.clone();
            tokio::spawn(async move {
                let result =
                    tokio::task::spawn_blocking(move || activity.report(&metrics)).await;
                if let Ok(Err(err)) = result {
                    log_warn!("posture log failed (non-critical): {err:?}");
                }
            });
        }

        self.events
            .emit(RecorderEvent::MetricsReceived(metrics.clone()));
        self.dispatcher.lock().await.handle(metrics).await;
    }

    fn record_failure(&self, number: u64, stage: &str, err: anyhow::Error) {
        self.stats.record_failed();
        log_error!("frame {number} {stage} failed: {err:?}");
        self.events
            .emit(RecorderEvent::StatsUpdated(self.stats.snapshot()));
    }
}

#[async_trait]
impl FrameSink for UploadPipeline {
    async fn process(&self, frame: CapturedFrame) {
        self.run(frame).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::VoiceChannel;
    use crate::collaborators::{FeedbackClient, SpeechClient};
    use crate::config::AlertSettings;
    use crate::utils::test_http::serve;
    use chrono::Utc;
    use std::time::Duration;
    use tokio::sync::broadcast::Receiver;

    fn frame(number: u64) -> CapturedFrame {
        CapturedFrame {
            number,
            captured_at: Utc::now(),
            jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
        }
    }

    fn pipeline_with(
        storage_url: String,
        metrics_url: String,
        feedback_url: String,
        activity_url: String,
        speech_url: String,
    ) -> (UploadPipeline, Arc<SessionStats>, Receiver<RecorderEvent>) {
        let events = EventBus::default();
        let receiver = events.subscribe();
        let stats = Arc::new(SessionStats::new());

        let dispatcher = AlertDispatcher::new(
            FeedbackClient::new(feedback_url),
            SpeechClient::new(speech_url),
            VoiceChannel::new(),
            events.clone(),
            &AlertSettings::default(),
        );

        let pipeline = UploadPipeline::new(
            "posturepal-test".into(),
            StorageClient::new(storage_url),
            MetricsClient::new(metrics_url),
            ActivityLogClient::new(activity_url),
            Arc::new(Mutex::new(dispatcher)),
            Arc::clone(&stats),
            events,
        );
        (pipeline, stats, receiver)
    }

    async fn drain(receiver: &mut Receiver<RecorderEvent>) -> Vec<RecorderEvent> {
        let mut collected = Vec::new();
        while let Ok(Ok(event)) =
            tokio::time::timeout(Duration::from_millis(100), receiver.recv()).await
        {
            collected.push(event);
        }
        collected
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn bad_posture_frame_fires_banner_and_desktop_once() {
        let storage = serve(200, "application/json", br#"{"filename": "frame_000001.jpg", "size": 4}"#);
        let metrics = serve(
            200,
            "application/json",
            br#"{"posture": 0, "eye_strain": 6.0, "neck_strain": 0.9, "face_pitch": -14.0}"#,
        );
        let feedback = serve(200, "application/json", br#"{"feedback": "Sit up straight"}"#);
        // A broken activity log must not affect anything else.
        let activity = serve(500, "text/plain", b"boom");
        let speech = serve(200, "audio/mpeg", &[0u8; 16]);

        let (pipeline, stats, mut receiver) =
            pipeline_with(storage, metrics, feedback, activity, speech);

        pipeline.process(frame(1)).await;
        // Second bad frame lands well inside both cooldown windows.
        pipeline.process(frame(2)).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.uploaded, 2);
        assert_eq!(snapshot.failed, 0);

        let events = drain(&mut receiver).await;

        let banners: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                RecorderEvent::BannerChanged(Some(banner)) => Some(banner.message.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(banners, vec!["Sit up straight", "Sit up straight"]);

        let desktop_alerts = events
            .iter()
            .filter(|event| matches!(event, RecorderEvent::DesktopAlert { .. }))
            .count();
        assert_eq!(desktop_alerts, 1, "cooldown must block the second firing");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn good_posture_clears_the_banner() {
        let storage = serve(200, "application/json", br#"{"filename": "frame_000001.jpg"}"#);
        let metrics = serve(
            200,
            "application/json",
            br#"{"posture": 1, "eye_strain": 1.0, "neck_strain": 0.1, "face_pitch": 2.0}"#,
        );
        let feedback = serve(200, "application/json", br#"{"feedback": "unused"}"#);
        let activity = serve(200, "text/plain", b"ok");
        let speech = serve(200, "audio/mpeg", &[0u8; 4]);

        let (pipeline, stats, mut receiver) =
            pipeline_with(storage, metrics, feedback, activity, speech);

        pipeline.process(frame(1)).await;

        assert_eq!(stats.snapshot().uploaded, 1);

        let events = drain(&mut receiver).await;
        assert!(events
            .iter()
            .any(|event| matches!(event, RecorderEvent::BannerChanged(None))));
        assert!(!events
            .iter()
            .any(|event| matches!(event, RecorderEvent::DesktopAlert { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_upload_stops_the_frame_pipeline() {
        // Nothing listens on port 1; the storage call fails at transport.
        let (pipeline, stats, mut receiver) = pipeline_with(
            "http://127.0.0.1:1/upload".into(),
            "http://127.0.0.1:1/metrics".into(),
            "http://127.0.0.1:1/feedback".into(),
            "http://127.0.0.1:1/log".into(),
            "http://127.0.0.1:1/speak".into(),
        );

        pipeline.process(frame(1)).await;

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.uploaded, 0);
        assert_eq!(snapshot.failed, 1);

        let events = drain(&mut receiver).await;
        assert!(!events
            .iter()
            .any(|event| matches!(event, RecorderEvent::MetricsReceived(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_metrics_fetch_still_counts_the_upload() {
        let storage = serve(200, "application/json", br#"{"filename": "frame_000001.jpg"}"#);
        let metrics = serve(500, "application/json", br#"{"error": "scorer offline"}"#);
        let (pipeline, stats, mut receiver) = pipeline_with(
            storage,
            metrics,
            "http://127.0.0.1:1/feedback".into(),
            "http://127.0.0.1:1/log".into(),
            "http://127.0.0.1:1/speak".into(),
        );

        pipeline.process(frame(1)).await;

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.uploaded, 1);
        assert_eq!(snapshot.failed, 1);

        let events = drain(&mut receiver).await;
        assert!(!events
            .iter()
            .any(|event| matches!(event, RecorderEvent::BannerChanged(_))));
    }
}
