//! Dev harness: runs the full recording pipeline against the configured
//! endpoints with a synthetic camera instead of a real media session.
//!
//! Usage: `simulate [config.json] [duration-secs]`

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use tokio::sync::watch;

use posturepal_core::capture::{FrameSource, RawFrame};
use posturepal_core::collaborators::SessionCredential;
use posturepal_core::media::{ConnectionState, MediaSession};
use posturepal_core::{init_logging, RecorderConfig, RecorderController};

/// Moving-gradient frames, enough for the storage side to have something
/// non-trivial to compress and store.
struct SyntheticCamera {
    width: u32,
    height: u32,
    ticks: AtomicU64,
}

impl SyntheticCamera {
    fn new() -> Self {
        Self {
            width: 640,
            height: 360,
            ticks: AtomicU64::new(0),
        }
    }
}

impl FrameSource for SyntheticCamera {
    fn grab(&self) -> Option<RawFrame> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        let mut pixels = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                pixels.push((x + tick as u32) as u8);
                pixels.push((y * 2) as u8);
                pixels.push((tick * 8) as u8);
            }
        }
        Some(RawFrame {
            width: self.width,
            height: self.height,
            pixels,
        })
    }
}

struct SyntheticMedia {
    state_tx: watch::Sender<ConnectionState>,
    // Keeps the channel alive so sends latch even with no subscriber.
    _state_rx: watch::Receiver<ConnectionState>,
    camera: Arc<SyntheticCamera>,
}

impl SyntheticMedia {
    fn new() -> Self {
        let (state_tx, _state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            state_tx,
            _state_rx,
            camera: Arc::new(SyntheticCamera::new()),
        }
    }
}

#[async_trait]
impl MediaSession for SyntheticMedia {
    async fn connect(&self, credential: &SessionCredential) -> Result<()> {
        info!(
            "joining room {} as {} via {}",
            credential.room_name, credential.participant_name, credential.ws_url
        );
        let _ = self.state_tx.send(ConnectionState::Connecting);
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
        Arc::clone(&self.camera) as Arc<dyn FrameSource>
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let duration_secs: u64 = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(30);

    let config = match config_path {
        Some(path) => RecorderConfig::load(&path)?,
        None => RecorderConfig::default(),
    };

    let controller = RecorderController::new(config);

    // Mirror everything the UI would render into the log.
    let mut receiver = controller.events().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => info!("event: {json}"),
                Err(err) => info!("event (unserializable: {err}): {event:?}"),
            }
        }
    });

    let session = controller.start(Arc::new(SyntheticMedia::new())).await?;
    info!("session {} started for {duration_secs}s", session.id);

    let half = duration_secs / 2;
    tokio::time::sleep(Duration::from_secs(half)).await;

    // Exercise pause/resume in the middle of the run.
    controller.pause().await?;
    info!("paused for 5s");
    tokio::time::sleep(Duration::from_secs(5)).await;
    controller.resume().await?;

    tokio::time::sleep(Duration::from_secs(duration_secs - half)).await;

    let summary = controller.stop().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
