use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{PostureMetrics, RecorderStatus, StatsSnapshot};

/// Payload for the in-app feedback banner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackBanner {
    pub message: String,
    pub metrics: PostureMetrics,
}

/// Everything the presentation layer needs to render, published as it
/// happens. Consumers subscribe via [`EventBus::subscribe`]; a slow
/// consumer loses old events rather than stalling the pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RecorderEvent {
    StateChanged {
        status: RecorderStatus,
        session_id: Option<String>,
    },
    /// Once a second while a session exists; elapsed excludes paused time.
    Heartbeat { elapsed_secs: u64 },
    StatsUpdated(StatsSnapshot),
    MetricsReceived(PostureMetrics),
    /// `None` clears the banner (good posture).
    BannerChanged(Option<FeedbackBanner>),
    /// The OS-notification channel fired; the host shows the toast.
    DesktopAlert { message: String },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RecorderEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.tx.subscribe()
    }

    /// Publishing with no subscribers is fine; the event is simply dropped.
    pub fn emit(&self, event: RecorderEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
