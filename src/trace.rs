//! Logging macros that cost nothing unless the `tracing` feature is on.
//!
//! With the feature enabled they forward to the `tracing` crate; without it
//! they expand to nothing, so the engines carry no logging overhead by
//! default.
//!
//! ```bash
//! RUST_LOG=avl_tables=trace cargo test --features tracing
//! ```

#![allow(unused_macros)]

/// Trace-level event (rotations, tombstone reuse).
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level event (resizes).
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}
