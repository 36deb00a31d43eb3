use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// Capture cadence and frame settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordingSettings {
    /// Milliseconds between capture ticks. This is a still-frame cadence,
    /// not a video frame rate.
    pub capture_interval_ms: u64,
    /// JPEG quality factor, 1-100.
    pub jpeg_quality: u8,
    pub session_id_prefix: String,
    /// Uploads allowed in flight at once; frames beyond this are dropped
    /// and counted as failed.
    pub max_inflight_uploads: usize,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            capture_interval_ms: 5_000,
            jpeg_quality: 80,
            session_id_prefix: "posturepal".into(),
            max_inflight_uploads: 4,
        }
    }
}

impl RecordingSettings {
    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.capture_interval_ms)
    }
}

/// Alert channel gating. The in-app banner has no cooldown; only the
/// desktop and voice channels are gated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertSettings {
    pub desktop_cooldown_secs: u64,
    pub voice_cooldown_secs: u64,
    /// Shown when the feedback service has nothing usable to say.
    pub fallback_feedback: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            desktop_cooldown_secs: 60,
            voice_cooldown_secs: 30,
            fallback_feedback: "Please adjust your posture".into(),
        }
    }
}

impl AlertSettings {
    pub fn desktop_cooldown(&self) -> Duration {
        Duration::from_secs(self.desktop_cooldown_secs)
    }

    pub fn voice_cooldown(&self) -> Duration {
        Duration::from_secs(self.voice_cooldown_secs)
    }
}

/// Addresses of the external services the core talks to. Defaults match
/// the local development layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoints {
    pub storage_url: String,
    pub metrics_url: String,
    pub feedback_url: String,
    pub activity_log_url: String,
    pub speech_url: String,
    pub token_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            storage_url: "http://localhost:3000/api/upload-frame".into(),
            metrics_url: "http://localhost:5500/api/get_metrics".into(),
            feedback_url: "http://localhost:5001/api/ai_feedback".into(),
            activity_log_url: "http://localhost:3500/api/app.py".into(),
            speech_url: "http://localhost:3000/api/speak".into(),
            token_url: "http://localhost:3000/api/token".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecorderConfig {
    pub recording: RecordingSettings,
    pub alerts: AlertSettings,
    pub endpoints: Endpoints,
}

impl RecorderConfig {
    /// Loads config from a JSON file. A missing file yields the defaults;
    /// unparseable contents are an error rather than silently ignored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }
}
