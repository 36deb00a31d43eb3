use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Monotonic per-session counters. A new session gets a fresh instance;
/// nothing ever resets them mid-session.
#[derive(Debug, Default)]
pub struct SessionStats {
    captured: AtomicU64,
    uploaded: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub captured: u64,
    pub uploaded: u64,
    pub failed: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the next frame number. Numbers advance only when a still was
    /// actually produced, so the captured counter and the latest frame
    /// number always agree.
    pub fn next_frame_number(&self) -> u64 {
        self.captured.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_uploaded(&self) {
        self.uploaded.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            captured: self.captured.load(Ordering::SeqCst),
            uploaded: self.uploaded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_numbers_start_at_one_and_increase() {
        let stats = SessionStats::new();
        assert_eq!(stats.next_frame_number(), 1);
        assert_eq!(stats.next_frame_number(), 2);
        assert_eq!(stats.next_frame_number(), 3);
        assert_eq!(stats.snapshot().captured, 3);
    }

    #[test]
    fn counters_are_independent() {
        let stats = SessionStats::new();
        stats.next_frame_number();
        stats.record_uploaded();
        stats.record_failed();
        stats.record_failed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.captured, 1);
        assert_eq!(snapshot.uploaded, 1);
        assert_eq!(snapshot.failed, 2);
    }
}
