//! Logging helpers.
//!
//! Events are emitted through `tracing` only when the `logging` feature is
//! enabled; otherwise these macros expand to nothing.
//!
//! # Log Levels
//!
//! - **DEBUG**: rejected paths, base directory resolution
//! - **TRACE**: every path a wrapper forwards to its dependency

macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        tracing::debug!($($arg)*);
    };
}

macro_rules! log_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        tracing::trace!($($arg)*);
    };
}
