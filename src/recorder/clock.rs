use std::time::{Duration, Instant};

/// Wall-clock bookkeeping for one recording attempt.
///
/// Elapsed time excludes paused intervals:
/// `elapsed = now - started - paused_total`, where a pause still in
/// progress counts toward the total. Callers pass `now` explicitly so the
/// arithmetic stays deterministic under test.
#[derive(Debug, Clone)]
pub struct SessionClock {
    started: Instant,
    paused_total: Duration,
    paused_since: Option<Instant>,
}

impl SessionClock {
    pub fn start(now: Instant) -> Self {
        Self {
            started: now,
            paused_total: Duration::ZERO,
            paused_since: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// No-op if already paused.
    pub fn pause(&mut self, now: Instant) {
        if self.paused_since.is_none() {
            self.paused_since = Some(now);
        }
    }

    /// Folds the pause interval into the running total. No-op if not paused.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_since.take() {
            self.paused_total += now.duration_since(paused_at);
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let paused = self.paused_total
            + self
                .paused_since
                .map(|at| now.duration_since(at))
                .unwrap_or(Duration::ZERO);
        now.duration_since(self.started).saturating_sub(paused)
    }
}
