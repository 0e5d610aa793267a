use std::io;
use std::path::{Path, PathBuf};

use metadata::MetadataError;
use snapshot::SnapshotError;
use vcs::VcsError;

/// Failure that aborts a store, update, or apply run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Querying git failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),
    /// The snapshot could not be parsed, or its schema is not supported.
    #[error("'{}': {source}", .path.display())]
    Snapshot {
        /// Snapshot file involved.
        path: PathBuf,
        /// Codec failure.
        #[source]
        source: SnapshotError,
    },
    /// Reading the metadata of a tracked path failed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// Update needs a snapshot to start from.
    #[error("'{}' does not exist; run --store first", .path.display())]
    MissingBaseline {
        /// Expected snapshot location.
        path: PathBuf,
    },
    /// Update was asked for columns the baseline does not carry.
    #[error("fields `{requested}' differ from the recorded fields `{recorded}'; run --store to change them")]
    FieldMismatch {
        /// Requested selection.
        requested: String,
        /// Selection recorded in the baseline.
        recorded: String,
    },
    /// A filesystem operation on the snapshot failed.
    #[error("failed to {context} '{}': {source}", .path.display())]
    Io {
        /// Attempted action.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Error reported by the operating system.
        #[source]
        source: io::Error,
    },
}

impl EngineError {
    pub(crate) fn io(context: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn snapshot(path: &Path, source: SnapshotError) -> Self {
        Self::Snapshot {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the codec failure when the snapshot itself was at fault.
    #[must_use]
    pub const fn snapshot_error(&self) -> Option<&SnapshotError> {
        match self {
            Self::Snapshot { source, .. } => Some(source),
            _ => None,
        }
    }
}
