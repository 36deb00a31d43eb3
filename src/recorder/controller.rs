use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use uuid::Uuid;

use crate::alerts::{AlertDispatcher, VoiceChannel};
use crate::capture::CaptureController;
use crate::collaborators::{
    ActivityLogClient, FeedbackClient, MetricsClient, SpeechClient, StorageClient, TokenClient,
};
use crate::config::RecorderConfig;
use crate::events::{EventBus, RecorderEvent};
use crate::media::{ConnectionState, MediaSession};
use crate::models::{RecorderStatus, Session, SessionStats, StatsSnapshot};
use crate::upload::UploadPipeline;

use super::clock::SessionClock;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderSnapshot {
    pub status: RecorderStatus,
    pub session_id: Option<String>,
    pub elapsed_secs: u64,
    pub stats: StatsSnapshot,
}

struct ActiveSession {
    session: Session,
    clock: SessionClock,
    capture: CaptureController,
    heartbeat: Option<JoinHandle<()>>,
    paused_tx: watch::Sender<bool>,
    media: Arc<dyn MediaSession>,
    stats: Arc<SessionStats>,
}

/// Drives one recording session at a time: credential fetch, media
/// connect, capture loop, pause/resume, teardown. All observable state
/// flows out through the event bus.
#[derive(Clone)]
pub struct RecorderController {
    config: RecorderConfig,
    events: EventBus,
    active: Arc<Mutex<Option<ActiveSession>>>,
}

impl RecorderController {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            events: EventBus::default(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn start(&self, media: Arc<dyn MediaSession>) -> Result<Session> {
        {
            let active = self.active.lock().await;
            if active.is_some() {
                bail!("recording already active");
            }
        }

        let session_id = format!(
            "{}-{}",
            self.config.recording.session_id_prefix,
            Uuid::new_v4()
        );
        let room_name = session_id.clone();
        let participant = format!("user-{}", Uuid::new_v4());

        self.events.emit(RecorderEvent::StateChanged {
            status: RecorderStatus::Connecting,
            session_id: Some(session_id.clone()),
        });

        let credential = {
            let token = TokenClient::new(&self.config.endpoints.token_url);
            let room = room_name.clone();
            let user = participant.clone();
            tokio::task::spawn_blocking(move || token.issue(&room, &user))
                .await
                .context("credential worker join failed")??
        };

        // Subscribe before connecting so the Connected transition cannot
        // slip past between the two calls.
        let mut state_rx = media.connection_state();
        media
            .connect(&credential)
            .await
            .context("media session connect failed")?;
        wait_until_connected(&mut state_rx).await?;
        info!("media session connected for {session_id}");

        let session = Session {
            id: session_id,
            room_name,
            participant,
            started_at: Utc::now(),
        };

        let stats = Arc::new(SessionStats::new());
        let endpoints = &self.config.endpoints;

        let dispatcher = AlertDispatcher::new(
            FeedbackClient::new(&endpoints.feedback_url),
            SpeechClient::new(&endpoints.speech_url),
            VoiceChannel::new(),
            self.events.clone(),
            &self.config.alerts,
        );
        let pipeline = Arc::new(UploadPipeline::new(
            session.id.clone(),
            StorageClient::new(&endpoints.storage_url),
            MetricsClient::new(&endpoints.metrics_url),
            ActivityLogClient::new(&endpoints.activity_log_url),
            Arc::new(Mutex::new(dispatcher)),
            Arc::clone(&stats),
            self.events.clone(),
        ));

        let (paused_tx, paused_rx) = watch::channel(false);
        let mut capture = CaptureController::new();
        capture.start(
            self.config.recording.clone(),
            media.frame_source(),
            pipeline,
            Arc::clone(&stats),
            self.events.clone(),
            paused_rx,
        )?;

        {
            let mut active = self.active.lock().await;
            *active = Some(ActiveSession {
                session: session.clone(),
                clock: SessionClock::start(Instant::now()),
                capture,
                heartbeat: None,
                paused_tx,
                media,
                stats,
            });
        }

        // The heartbeat reads the stored session, so it only spawns once
        // the session is visible.
        let heartbeat = self.spawn_heartbeat();
        {
            let mut active = self.active.lock().await;
            if let Some(current) = active.as_mut() {
                current.heartbeat = Some(heartbeat);
            }
        }

        self.events.emit(RecorderEvent::StateChanged {
            status: RecorderStatus::Recording,
            session_id: Some(session.id.clone()),
        });

        Ok(session)
    }

    pub async fn pause(&self) -> Result<()> {
        let session_id = {
            let mut guard = self.active.lock().await;
            let active = guard
                .as_mut()
                .ok_or_else(|| anyhow!("no active recording to pause"))?;
            if active.clock.is_paused() {
                bail!("recording already paused");
            }
            active.clock.pause(Instant::now());
            let _ = active.paused_tx.send(true);
            active.session.id.clone()
        };

        self.events.emit(RecorderEvent::StateChanged {
            status: RecorderStatus::Paused,
            session_id: Some(session_id),
        });
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        let session_id = {
            let mut guard = self.active.lock().await;
            let active = guard
                .as_mut()
                .ok_or_else(|| anyhow!("no active recording to resume"))?;
            if !active.clock.is_paused() {
                bail!("recording is not paused");
            }
            active.clock.resume(Instant::now());
            let _ = active.paused_tx.send(false);
            active.session.id.clone()
        };

        self.events.emit(RecorderEvent::StateChanged {
            status: RecorderStatus::Recording,
            session_id: Some(session_id),
        });
        Ok(())
    }

    /// Tears the session down and reports the final numbers. In-flight
    /// uploads are not cancelled; any late results land in state that is
    /// being discarded along with the session.
    pub async fn stop(&self) -> Result<RecorderSnapshot> {
        let mut active = {
            let mut guard = self.active.lock().await;
            guard
                .take()
                .ok_or_else(|| anyhow!("no active recording to stop"))?
        };

        if let Err(err) = active.capture.stop().await {
            warn!("capture teardown failed: {err:?}");
        }
        if let Some(heartbeat) = active.heartbeat.take() {
            heartbeat.abort();
        }
        active.media.disconnect().await;

        let summary = RecorderSnapshot {
            status: RecorderStatus::Idle,
            session_id: Some(active.session.id.clone()),
            elapsed_secs: active.clock.elapsed(Instant::now()).as_secs(),
            stats: active.stats.snapshot(),
        };
        info!(
            "session {} stopped after {}s ({} captured, {} uploaded, {} failed)",
            active.session.id,
            summary.elapsed_secs,
            summary.stats.captured,
            summary.stats.uploaded,
            summary.stats.failed
        );

        self.events.emit(RecorderEvent::StateChanged {
            status: RecorderStatus::Idle,
            session_id: None,
        });

        Ok(summary)
    }

    pub async fn snapshot(&self) -> RecorderSnapshot {
        let guard = self.active.lock().await;
        match guard.as_ref() {
            Some(active) => RecorderSnapshot {
                status: if active.clock.is_paused() {
                    RecorderStatus::Paused
                } else {
                    RecorderStatus::Recording
                },
                session_id: Some(active.session.id.clone()),
                elapsed_secs: active.clock.elapsed(Instant::now()).as_secs(),
                stats: active.stats.snapshot(),
            },
            None => RecorderSnapshot {
                status: RecorderStatus::Idle,
                session_id: None,
                elapsed_secs: 0,
                stats: StatsSnapshot::default(),
            },
        }
    }

    fn spawn_heartbeat(&self) -> JoinHandle<()> {
        let active = Arc::clone(&self.active);
        let events = self.events.clone();

        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;

                let elapsed_secs = {
                    let guard = active.lock().await;
                    match guard.as_ref() {
                        Some(session) => session.clock.elapsed(Instant::now()).as_secs(),
                        None => break,
                    }
                };
                events.emit(RecorderEvent::Heartbeat { elapsed_secs });
            }
        })
    }
}

async fn wait_until_connected(state_rx: &mut watch::Receiver<ConnectionState>) -> Result<()> {
    loop {
        if *state_rx.borrow_and_update() == ConnectionState::Connected {
            return Ok(());
        }
        state_rx
            .changed()
            .await
            .context("media session closed before connecting")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FrameSource, RawFrame};
    use crate::collaborators::SessionCredential;
    use crate::utils::test_http::serve;
    use async_trait::async_trait;

    struct IdleSource;

    impl FrameSource for IdleSource {
        // Surface never becomes ready; every tick is a silent skip.
        fn grab(&self) -> Option<RawFrame> {
            None
        }
    }

    struct FakeMedia {
        state_tx: watch::Sender<ConnectionState>,
        // Keeps the channel alive so sends latch even with no subscriber.
        _state_rx: watch::Receiver<ConnectionState>,
    }

    impl FakeMedia {
        fn new() -> Self {
            let (state_tx, _state_rx) = watch::channel(ConnectionState::Disconnected);
            Self { state_tx, _state_rx }
        }
    }

    #[async_trait]
    impl MediaSession for FakeMedia {
        async fn connect(&self, _credential: &SessionCredential) -> Result<()> {
            let _ = self.state_tx.send(ConnectionState::Connected);
            Ok(())
        }

        async fn disconnect(&self) {
            let _ = self.state_tx.send(ConnectionState::Disconnected);
        }

        fn connection_state(&self) -> watch::Receiver<ConnectionState> {
            self.state_tx.subscribe()
        }

        fn frame_source(&self) -> Arc<dyn FrameSource> {
            Arc::new(IdleSource)
        }
    }

    fn controller_with_token_server() -> RecorderController {
        let token_url = serve(
            200,
            "application/json",
            br#"{"token": "jwt", "wsUrl": "wss://media.local", "roomName": "r", "participantName": "p"}"#,
        );
        let mut config = RecorderConfig::default();
        config.endpoints.token_url = token_url;
        RecorderController::new(config)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn lifecycle_transitions_are_observable() {
        let controller = controller_with_token_server();
        let media = Arc::new(FakeMedia::new());

        assert_eq!(controller.snapshot().await.status, RecorderStatus::Idle);

        let session = controller.start(media).await.unwrap();
        assert!(session.id.starts_with("posturepal-"));
        assert_eq!(controller.snapshot().await.status, RecorderStatus::Recording);

        controller.pause().await.unwrap();
        assert_eq!(controller.snapshot().await.status, RecorderStatus::Paused);
        assert!(controller.pause().await.is_err());

        controller.resume().await.unwrap();
        assert_eq!(controller.snapshot().await.status, RecorderStatus::Recording);
        assert!(controller.resume().await.is_err());

        let summary = controller.stop().await.unwrap();
        assert_eq!(summary.stats.captured, 0);
        assert_eq!(controller.snapshot().await.status, RecorderStatus::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn second_start_is_rejected() {
        let controller = controller_with_token_server();

        controller.start(Arc::new(FakeMedia::new())).await.unwrap();
        let second = controller.start(Arc::new(FakeMedia::new())).await;
        assert!(second.is_err());

        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn controls_require_an_active_session() {
        let controller = RecorderController::new(RecorderConfig::default());

        assert!(controller.pause().await.is_err());
        assert!(controller.resume().await.is_err());
        assert!(controller.stop().await.is_err());
    }
}
