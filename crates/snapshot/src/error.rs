use std::io;

/// Failures while reading or writing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The header or a record does not follow the snapshot format.
    #[error("malformed snapshot at line {line}: {reason}")]
    Malformed {
        /// One-based line number of the offending line.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
    /// The snapshot was written by a schema version this build cannot read.
    #[error("unsupported snapshot schema: {app} {version} (expected 1.0.x)")]
    UnsupportedSchema {
        /// Application name from the header.
        app: String,
        /// Version string from the header.
        version: String,
    },
    /// A timestamp cannot be represented in the text format.
    #[error("timestamp {0} is outside the representable range")]
    TimestampRange(i64),
}

impl SnapshotError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// A field name that is not part of the snapshot schema.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown field `{0}'")]
pub struct UnknownFieldError(pub String);
