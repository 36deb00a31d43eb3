mod frame;
mod metrics;
mod session;
mod stats;

pub use frame::CapturedFrame;
pub use metrics::PostureMetrics;
pub use session::{RecorderStatus, Session};
pub use stats::{SessionStats, StatsSnapshot};
