use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::models::PostureMetrics;

use super::http_agent;

#[derive(Debug, Deserialize)]
struct FeedbackResponse {
    feedback: Option<String>,
}

/// Asks the coaching service for feedback text matching a metrics result.
/// Callers are expected to fall back to a fixed message when this fails;
/// an empty response counts as a failure here so that the fallback kicks in.
#[derive(Clone)]
pub struct FeedbackClient {
    agent: ureq::Agent,
    url: String,
}

impl FeedbackClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            agent: http_agent(),
            url: url.into(),
        }
    }

    pub fn request(&self, metrics: &PostureMetrics) -> Result<String> {
        let response = self
            .agent
            .post(&self.url)
            .send_json(metrics)
            .context("feedback request failed")?;

        let parsed: FeedbackResponse = response
            .into_json()
            .context("feedback response was not valid JSON")?;

        parsed
            .feedback
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow!("feedback response had no usable text"))
    }
}
