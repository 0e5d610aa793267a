//! crates/logging/src/tracing_macros.rs
//! Convenience macros for per-action trace lines.
//!
//! These wrap [`tracing::info!`] with the target of the emitting engine so
//! verbose output can be filtered per operation through the log filter.

/// Emit a store progress line.
///
/// # Example
/// ```ignore
/// trace_store!("stored {} entries", count);
/// ```
#[macro_export]
macro_rules! trace_store {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::targets::STORE, $($arg)*);
    };
}

/// Emit an update progress line.
///
/// # Example
/// ```ignore
/// trace_update!("refreshed `{}'", path);
/// ```
#[macro_export]
macro_rules! trace_update {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::targets::UPDATE, $($arg)*);
    };
}

/// Emit an apply action line.
///
/// # Example
/// ```ignore
/// trace_apply!("`{}' set mtime to {}", path, stamp);
/// ```
#[macro_export]
macro_rules! trace_apply {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::targets::APPLY, $($arg)*);
    };
}

/// Emit a git invocation trace.
///
/// # Example
/// ```ignore
/// trace_git!("running git {:?}", args);
/// ```
#[macro_export]
macro_rules! trace_git {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: $crate::targets::GIT, $($arg)*);
    };
}
