//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag,
//! so chatty per-event logging in the reconstructor can be switched off
//! wholesale without touching call sites.
//!
//! ```rust
//! const ENABLE_LOGS: bool = true;
//!
//! use mpv_history::{log_debug, log_warn};
//!
//! log_debug!("only logged while ENABLE_LOGS is true");
//! log_warn!("same, at warn level");
//! ```

/// Debug-level logging, gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Info-level logging, gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn-level logging, gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}
