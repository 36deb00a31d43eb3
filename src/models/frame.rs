use chrono::{DateTime, Utc};

/// A single still image captured from the live feed at one scheduler tick.
///
/// Frame numbers start at 1 and are unique within a session; a tick that
/// produced no image never claims a number.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub number: u64,
    pub captured_at: DateTime<Utc>,
    /// JPEG-compressed payload, ready for upload.
    pub jpeg: Vec<u8>,
}
