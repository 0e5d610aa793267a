//! crates/logging/src/layer.rs
//! `tracing-subscriber` layer rendering events in the command-line format.
//!
//! Warnings carry a `warn: ` prefix and errors an `error: ` prefix, matching
//! the per-path diagnostics operators grep for; info events print bare so the
//! verbose output reads as an action log.

use std::fmt::{self, Write as _};

use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::sink::DiagnosticSink;
use crate::verbosity::Verbosity;

/// Layer writing one line per event into a [`DiagnosticSink`].
#[derive(Debug)]
pub struct DiagnosticLayer {
    max_level: Option<Level>,
    sink: DiagnosticSink,
}

impl DiagnosticLayer {
    /// Creates a layer rendering events up to `verbosity`'s level.
    #[must_use]
    pub fn new(verbosity: Verbosity, sink: DiagnosticSink) -> Self {
        Self {
            max_level: Some(verbosity.max_level()),
            sink,
        }
    }

    /// Creates a layer that renders every event reaching it.
    ///
    /// Used together with an `EnvFilter`, which then owns level selection.
    #[must_use]
    pub fn unfiltered(sink: DiagnosticSink) -> Self {
        Self {
            max_level: None,
            sink,
        }
    }

    fn admits(&self, level: &Level) -> bool {
        self.max_level.is_none_or(|max| *level <= max)
    }

    fn render(level: &Level, visitor: &MessageVisitor) -> String {
        let prefix = match *level {
            Level::ERROR => "error: ",
            Level::WARN => "warn: ",
            Level::INFO => "",
            Level::DEBUG | Level::TRACE => "debug: ",
        };
        let mut line = String::with_capacity(prefix.len() + visitor.message.len());
        line.push_str(prefix);
        line.push_str(&visitor.message);
        for (name, value) in &visitor.fields {
            let _ = write!(line, " {name}={value}");
        }
        line
    }
}

impl<S> Layer<S> for DiagnosticLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.admits(metadata.level())
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = event.metadata().level();
        if !self.admits(level) {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        // Diagnostics have nowhere else to go when stderr itself fails.
        let _ = self.sink.write_line(&Self::render(level, &visitor));
    }
}

/// Collects the `message` field plus any structured fields of an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push((field.name(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        } else {
            self.fields.push((field.name(), value.to_owned()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets;
    use test_support::SharedBuffer;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(verbosity: Verbosity, emit: impl FnOnce()) -> String {
        let buffer = SharedBuffer::default();
        let layer = DiagnosticLayer::new(verbosity, DiagnosticSink::new(buffer.clone()));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, emit);
        buffer.contents()
    }

    #[test]
    fn warnings_are_prefixed() {
        let output = capture(Verbosity::Normal, || {
            tracing::warn!(target: targets::APPLY, "`a' does not exist");
        });
        assert_eq!(output, "warn: `a' does not exist\n");
    }

    #[test]
    fn info_hidden_unless_verbose() {
        let quiet = capture(Verbosity::Normal, || {
            tracing::info!(target: targets::APPLY, "set mtime");
        });
        assert!(quiet.is_empty());

        let verbose = capture(Verbosity::Verbose, || {
            tracing::info!(target: targets::APPLY, "set mtime");
        });
        assert_eq!(verbose, "set mtime\n");
    }

    #[test]
    fn debug_requires_debug_verbosity() {
        let verbose = capture(Verbosity::Verbose, || {
            tracing::debug!(target: targets::GIT, "git ls-files");
        });
        assert!(verbose.is_empty());

        let debug = capture(Verbosity::Debug, || {
            tracing::debug!(target: targets::GIT, "git ls-files");
        });
        assert_eq!(debug, "debug: git ls-files\n");
    }

    #[test]
    fn structured_fields_follow_message() {
        let output = capture(Verbosity::Normal, || {
            tracing::error!(target: targets::STORE, entries = 3, "aborted");
        });
        assert_eq!(output, "error: aborted entries=3\n");
    }
}
