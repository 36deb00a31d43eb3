use anyhow::{Context, Result};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::CapturedFrame;

use super::http_agent;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadFrameRequest<'a> {
    frame_data: String,
    session_id: &'a str,
    frame_number: u64,
    timestamp: DateTime<Utc>,
}

/// What the storage service reports once a frame is written out.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFrame {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub frame_number: u64,
}

#[derive(Clone)]
pub struct StorageClient {
    agent: ureq::Agent,
    url: String,
}

impl StorageClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            agent: http_agent(),
            url: url.into(),
        }
    }

    /// Ships one frame as a base64 data URL plus session bookkeeping.
    pub fn save_frame(&self, session_id: &str, frame: &CapturedFrame) -> Result<StoredFrame> {
        let frame_data = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&frame.jpeg)
        );
        let body = UploadFrameRequest {
            frame_data,
            session_id,
            frame_number: frame.number,
            timestamp: frame.captured_at,
        };

        let response = self
            .agent
            .post(&self.url)
            .send_json(&body)
            .with_context(|| format!("frame {} upload failed", frame.number))?;

        response
            .into_json::<StoredFrame>()
            .context("storage response was not valid JSON")
    }
}
