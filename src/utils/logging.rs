//! Per-module switchable logging.
//!
//! Modules that log on every reading (the telemetry forwarder, the HTTP
//! handlers) declare a `const ENABLE_LOGS: bool` and log through these
//! macros, so a noisy module can be silenced without touching `RUST_LOG`.
//!
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_info, log_warn};
//!
//! log_info!("forwarded reading {}", id);
//! ```

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

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
