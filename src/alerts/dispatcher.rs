use std::time::{Duration, Instant};

use crate::collaborators::{FeedbackClient, SpeechClient};
use crate::config::AlertSettings;
use crate::events::{EventBus, FeedbackBanner, RecorderEvent};
use crate::models::PostureMetrics;

use super::voice::VoiceChannel;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Which channels fire for one metrics result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AlertPlan {
    clear_banner: bool,
    show_banner: bool,
    fire_desktop: bool,
    fire_voice: bool,
}

/// Fans a per-frame classification out to the banner, desktop and voice
/// channels. The banner updates on every result; desktop and voice each
/// run an IDLE -> COOLDOWN -> IDLE machine keyed on their last firing
/// instant, and voice additionally refuses to overlap playback.
///
/// All gating state lives here, owned by the instance.
pub struct AlertDispatcher {
    feedback: FeedbackClient,
    speech: SpeechClient,
    voice: VoiceChannel,
    events: EventBus,
    fallback_feedback: String,
    desktop_cooldown: Duration,
    voice_cooldown: Duration,
    desktop_last_fired: Option<Instant>,
    voice_last_fired: Option<Instant>,
    last_metrics: Option<PostureMetrics>,
}

impl AlertDispatcher {
    pub fn new(
        feedback: FeedbackClient,
        speech: SpeechClient,
        voice: VoiceChannel,
        events: EventBus,
        settings: &AlertSettings,
    ) -> Self {
        Self {
            feedback,
            speech,
            voice,
            events,
            fallback_feedback: settings.fallback_feedback.clone(),
            desktop_cooldown: settings.desktop_cooldown(),
            voice_cooldown: settings.voice_cooldown(),
            desktop_last_fired: None,
            voice_last_fired: None,
            last_metrics: None,
        }
    }

    /// The most recent metrics handed to the dispatcher, each result
    /// overwriting the one before it.
    pub fn last_metrics(&self) -> Option<&PostureMetrics> {
        self.last_metrics.as_ref()
    }

    pub async fn handle(&mut self, metrics: PostureMetrics) {
        let plan = self.plan(&metrics, self.voice.is_playing(), Instant::now());

        if plan.clear_banner {
            self.events.emit(RecorderEvent::BannerChanged(None));
            return;
        }

        // One feedback text backs every firing channel; a failed fetch
        // falls back rather than surfacing an error to the user.
        let text = self.feedback_text(&metrics).await;

        if plan.show_banner {
            self.events.emit(RecorderEvent::BannerChanged(Some(FeedbackBanner {
                message: text.clone(),
                metrics: metrics.clone(),
            })));
        }
        if plan.fire_desktop {
            self.events.emit(RecorderEvent::DesktopAlert {
                message: text.clone(),
            });
        }
        if plan.fire_voice {
            self.speak(text).await;
        }
    }

    /// Pure cooldown bookkeeping: records the metrics, stamps the channels
    /// that fire, and reports the decision. Split from `handle` so the
    /// gating rules are testable without network or audio.
    fn plan(&mut self, metrics: &PostureMetrics, voice_busy: bool, now: Instant) -> AlertPlan {
        self.last_metrics = Some(metrics.clone());

        if !metrics.is_slouching() {
            // Good posture clears the banner only; cooldowns decay by
            // elapsed time, never by good results.
            return AlertPlan {
                clear_banner: true,
                show_banner: false,
                fire_desktop: false,
                fire_voice: false,
            };
        }

        let fire_desktop = cooldown_elapsed(self.desktop_last_fired, self.desktop_cooldown, now);
        if fire_desktop {
            self.desktop_last_fired = Some(now);
        }

        let fire_voice =
            !voice_busy && cooldown_elapsed(self.voice_last_fired, self.voice_cooldown, now);
        if fire_voice {
            self.voice_last_fired = Some(now);
        }

        AlertPlan {
            clear_banner: false,
            show_banner: true,
            fire_desktop,
            fire_voice,
        }
    }

    async fn feedback_text(&self, metrics: &PostureMetrics) -> String {
        let feedback = self.feedback.clone();
        let metrics = metrics.clone();
        let result =
            tokio::task::spawn_blocking(move || feedback.request(&metrics)).await;

        match result {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                log_warn!("feedback request failed, using fallback: {err:?}");
                self.fallback_feedback.clone()
            }
            Err(err) => {
                log_warn!("feedback worker join failed, using fallback: {err}");
                self.fallback_feedback.clone()
            }
        }
    }

    async fn speak(&self, text: String) {
        let speech = self.speech.clone();
        let result = tokio::task::spawn_blocking(move || speech.synthesize(&text)).await;

        match result {
            Ok(Ok(clip)) => {
                if let Err(err) = self.voice.play(clip) {
                    log_warn!("voice alert dropped: {err}");
                }
            }
            Ok(Err(err)) => log_warn!("speech synthesis failed: {err:?}"),
            Err(err) => log_warn!("speech synthesis worker join failed: {err}"),
        }
    }
}

fn cooldown_elapsed(last_fired: Option<Instant>, cooldown: Duration, now: Instant) -> bool {
    last_fired
        .map(|at| now.duration_since(at) >= cooldown)
        .unwrap_or(true)
}
