//! Logging macros gated on a module-level `ENABLE_LOGS` const.
//!
//! Modules with chatty per-tick or per-frame logging declare
//! `const ENABLE_LOGS: bool = ...;` and use these instead of the `log`
//! macros directly, so noisy paths can be silenced per module without
//! touching the global filter.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
