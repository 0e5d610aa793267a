#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` renders the diagnostics emitted by the git-store-meta engines.
//! Engines report through ordinary [`tracing`] macros using the targets in
//! [`targets`]; this crate turns those events into the terse line format the
//! command-line front-end prints on standard error.
//!
//! # Design
//!
//! - [`Verbosity`] maps the number of `-v` flags to the most verbose
//!   [`tracing::Level`] that is rendered.
//! - [`DiagnosticSink`] is a cloneable handle around any [`std::io::Write`]
//!   target so the binary can log to stderr while tests capture a buffer.
//! - [`DiagnosticLayer`] is a `tracing-subscriber` layer that formats each
//!   event as `warn: ...`, `error: ...`, `debug: ...` or a bare info line.
//! - [`dispatch`] assembles the layer with an optional `EnvFilter` read from
//!   [`LOG_ENV`], returning a [`tracing::Dispatch`] callers install for the
//!   duration of one invocation.
//!
//! # Examples
//!
//! ```
//! use logging::{DiagnosticSink, Verbosity, dispatch_with_filter, targets};
//!
//! let sink = DiagnosticSink::new(Vec::new());
//! let dispatch = dispatch_with_filter(Verbosity::Normal, sink.clone(), None);
//! tracing::dispatcher::with_default(&dispatch, || {
//!     tracing::warn!(target: targets::APPLY, "`a.txt' does not exist, skip applying metadata");
//! });
//! ```

mod layer;
mod sink;
mod tracing_macros;
mod verbosity;

pub use layer::DiagnosticLayer;
pub use sink::DiagnosticSink;
pub use verbosity::Verbosity;

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

/// Environment variable holding an `EnvFilter` directive set.
///
/// When present and valid it replaces the `-v` derived level filter.
pub const LOG_ENV: &str = "GIT_STORE_META_LOG";

/// Tracing targets used by the workspace crates.
pub mod targets {
    /// Full snapshot creation.
    pub const STORE: &str = "git_store_meta::store";
    /// Incremental snapshot refresh.
    pub const UPDATE: &str = "git_store_meta::update";
    /// Metadata restoration.
    pub const APPLY: &str = "git_store_meta::apply";
    /// Invocations of the git executable.
    pub const GIT: &str = "git_store_meta::git";
    /// Hook installation.
    pub const HOOKS: &str = "git_store_meta::hooks";
}

/// Reads the [`LOG_ENV`] filter, ignoring unset or unparsable values.
pub fn env_filter() -> Option<EnvFilter> {
    let value = std::env::var(LOG_ENV).ok()?;
    if value.trim().is_empty() {
        return None;
    }
    EnvFilter::try_new(value).ok()
}

/// Builds a dispatcher rendering into `sink`, honouring [`LOG_ENV`].
pub fn dispatch(verbosity: Verbosity, sink: DiagnosticSink) -> Dispatch {
    dispatch_with_filter(verbosity, sink, env_filter())
}

/// Builds a dispatcher with an explicit optional filter.
///
/// With a filter the layer renders every event the filter admits; without one
/// the layer applies the level implied by `verbosity`.
pub fn dispatch_with_filter(
    verbosity: Verbosity,
    sink: DiagnosticSink,
    filter: Option<EnvFilter>,
) -> Dispatch {
    match filter {
        Some(filter) => Dispatch::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(DiagnosticLayer::unfiltered(sink)),
        ),
        None => Dispatch::new(
            tracing_subscriber::registry().with(DiagnosticLayer::new(verbosity, sink)),
        ),
    }
}
