use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Semaphore};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::RecordingSettings;
use crate::events::{EventBus, RecorderEvent};
use crate::models::{CapturedFrame, SessionStats};

use super::source::{encode_jpeg, FrameSource};
use super::FrameSink;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const CAPTURE_TIMEOUT_SECS: u64 = 10;

/// Cadenced frame capture. Each tick rasterizes the current video frame on
/// a blocking worker and hands the JPEG to the sink on its own task; a
/// tick that produced nothing costs nothing. Paused sessions skip ticks
/// entirely.
pub async fn capture_loop(
    settings: RecordingSettings,
    source: Arc<dyn FrameSource>,
    sink: Arc<dyn FrameSink>,
    stats: Arc<SessionStats>,
    events: EventBus,
    paused: watch::Receiver<bool>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(settings.capture_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let inflight = Arc::new(Semaphore::new(settings.max_inflight_uploads));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if *paused.borrow() {
                    continue;
                }

                let grabbed = {
                    let source = Arc::clone(&source);
                    let quality = settings.jpeg_quality;
                    let worker = tokio::task::spawn_blocking(move || {
                        source.grab().map(|raw| encode_jpeg(&raw, quality)).transpose()
                    });
                    tokio::time::timeout(Duration::from_secs(CAPTURE_TIMEOUT_SECS), worker).await
                };

                let jpeg = match grabbed {
                    Ok(Ok(Ok(Some(jpeg)))) => jpeg,
                    // Surface not ready; skipped without consuming a frame number.
                    Ok(Ok(Ok(None))) => continue,
                    Ok(Ok(Err(err))) => {
                        log_error!("frame encode failed: {err:?}");
                        continue;
                    }
                    Ok(Err(err)) => {
                        log_error!("capture worker join failed: {err}");
                        continue;
                    }
                    Err(_) => {
                        log_warn!("capture timeout (> {}s)", CAPTURE_TIMEOUT_SECS);
                        continue;
                    }
                };

                let frame = CapturedFrame {
                    number: stats.next_frame_number(),
                    captured_at: Utc::now(),
                    jpeg,
                };
                log_info!("captured frame {} ({} bytes)", frame.number, frame.jpeg.len());
                events.emit(RecorderEvent::StatsUpdated(stats.snapshot()));

                let permit = match Arc::clone(&inflight).try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        stats.record_failed();
                        log_warn!("dropping frame {}: too many uploads in flight", frame.number);
                        events.emit(RecorderEvent::StatsUpdated(stats.snapshot()));
                        continue;
                    }
                };

                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    sink.process(frame).await;
                    drop(permit);
                });
            }
            _ = cancel_token.cancelled() => {
                log_info!("capture loop shutting down");
                break;
            }
        }
    }
}
