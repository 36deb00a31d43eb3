pub mod loop_worker;
pub mod source;

pub use source::{encode_jpeg, FrameSource, RawFrame};

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RecordingSettings;
use crate::events::EventBus;
use crate::models::{CapturedFrame, SessionStats};

use loop_worker::capture_loop;

/// Consumes the frames the capture loop produces. Each frame is handed
/// over exactly once.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn process(&self, frame: CapturedFrame);
}

/// Owns the capture loop task for one session.
pub struct CaptureController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl CaptureController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn start(
        &mut self,
        settings: RecordingSettings,
        source: Arc<dyn FrameSource>,
        sink: Arc<dyn FrameSink>,
        stats: Arc<SessionStats>,
        events: EventBus,
        paused: watch::Receiver<bool>,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("capture already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(capture_loop(
            settings,
            source,
            sink,
            stats,
            events,
            paused,
            token_clone,
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("capture loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for CaptureController {
    fn default() -> Self {
        Self::new()
    }
}
