use anyhow::{Context, Result};

use crate::models::PostureMetrics;

use super::http_agent;

/// Best-effort posture logging. The service reads metrics from query
/// parameters and its response carries no information; callers swallow
/// errors from this client entirely.
#[derive(Clone)]
pub struct ActivityLogClient {
    agent: ureq::Agent,
    url: String,
}

impl ActivityLogClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            agent: http_agent(),
            url: url.into(),
        }
    }

    pub fn report(&self, metrics: &PostureMetrics) -> Result<()> {
        self.agent
            .get(&self.url)
            .query("neck-strain", &metrics.neck_strain.to_string())
            .query("eye-strain", &metrics.eye_strain.to_string())
            .query("posture", &metrics.posture.to_string())
            .call()
            .context("activity log request failed")?;
        Ok(())
    }
}
