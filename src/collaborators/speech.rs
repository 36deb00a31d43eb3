use std::io::Read;

use anyhow::{Context, Result};

use super::http_agent;

/// Turns feedback text into an audio clip via the speech service.
#[derive(Clone)]
pub struct SpeechClient {
    agent: ureq::Agent,
    url: String,
}

impl SpeechClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            agent: http_agent(),
            url: url.into(),
        }
    }

    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let response = self
            .agent
            .post(&self.url)
            .send_json(serde_json::json!({ "text": text }))
            .context("speech synthesis request failed")?;

        let mut audio = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut audio)
            .context("failed reading synthesized audio")?;
        Ok(audio)
    }
}
