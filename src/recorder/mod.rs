pub mod clock;
mod controller;

pub use clock::SessionClock;
pub use controller::{RecorderController, RecorderSnapshot};
