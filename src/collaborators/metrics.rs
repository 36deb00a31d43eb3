use anyhow::{Context, Result};

use crate::models::PostureMetrics;

use super::http_agent;

/// Fetches the analysis result for an uploaded frame, keyed by its
/// sequence number.
#[derive(Clone)]
pub struct MetricsClient {
    agent: ureq::Agent,
    url: String,
}

impl MetricsClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            agent: http_agent(),
            url: url.into(),
        }
    }

    pub fn fetch(&self, frame_number: u64) -> Result<PostureMetrics> {
        let response = self
            .agent
            .get(&self.url)
            .query("id", &frame_number.to_string())
            .call()
            .with_context(|| format!("metrics fetch for frame {frame_number} failed"))?;

        response
            .into_json::<PostureMetrics>()
            .context("metrics response was not valid JSON")
    }
}
