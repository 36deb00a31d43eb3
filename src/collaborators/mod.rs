//! HTTP clients for the external services the core depends on but does not
//! implement. All clients are blocking (`ureq`); callers on the async side
//! wrap them in `spawn_blocking`. Transport failures and non-2xx statuses
//! are treated identically: the call just fails.

mod activity;
mod feedback;
mod metrics;
mod speech;
mod storage;
mod token;

pub use activity::ActivityLogClient;
pub use feedback::FeedbackClient;
pub use metrics::MetricsClient;
pub use speech::SpeechClient;
pub use storage::{StorageClient, StoredFrame};
pub use token::{SessionCredential, TokenClient};

use std::time::Duration;

pub(crate) fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(2))
        .timeout_read(Duration::from_secs(10))
        .build()
}
