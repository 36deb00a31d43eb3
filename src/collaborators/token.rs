use anyhow::{Context, Result};
use serde::Deserialize;

use super::http_agent;

/// Opaque, time-limited credential for joining a media room.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredential {
    pub token: String,
    pub ws_url: String,
    pub room_name: String,
    pub participant_name: String,
}

#[derive(Clone)]
pub struct TokenClient {
    agent: ureq::Agent,
    url: String,
}

impl TokenClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            agent: http_agent(),
            url: url.into(),
        }
    }

    pub fn issue(&self, room_name: &str, participant_name: &str) -> Result<SessionCredential> {
        let response = self
            .agent
            .get(&self.url)
            .query("roomName", room_name)
            .query("participantName", participant_name)
            .call()
            .context("credential request failed")?;

        response
            .into_json::<SessionCredential>()
            .context("credential response was not valid JSON")
    }
}
