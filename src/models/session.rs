use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RecorderStatus {
    Idle,
    Connecting,
    Recording,
    Paused,
}

impl Default for RecorderStatus {
    fn default() -> Self {
        RecorderStatus::Idle
    }
}

/// One continuous recording attempt, from start to stop. Discarded on stop;
/// the storage service keeps whatever frames were uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub room_name: String,
    pub participant: String,
    pub started_at: DateTime<Utc>,
}
