pub mod alerts;
pub mod capture;
pub mod collaborators;
pub mod config;
pub mod events;
pub mod media;
pub mod models;
pub mod recorder;
pub mod upload;
pub mod utils;

pub use config::RecorderConfig;
pub use events::{EventBus, RecorderEvent};
pub use models::{PostureMetrics, RecorderStatus, Session, StatsSnapshot};
pub use recorder::{RecorderController, RecorderSnapshot};

/// Initialize logging for host binaries (reads `RUST_LOG`).
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
