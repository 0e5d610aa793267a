#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `snapshot` defines the record model of a git-store-meta snapshot and the
//! tab-delimited text format it is persisted in:
//!
//! ```text
//! # generated by<TAB>git-store-meta<TAB>1.0.0
//! <file><TAB><type><TAB><mtime><TAB>...
//! src/main.rs<TAB>f<TAB>2024-01-02T03:04:05Z<TAB>...
//! ```
//!
//! # Design
//!
//! - [`RepoPath`] is a repository-relative byte path whose [`Ord`] is the
//!   byte-wise ("C" locale) order every snapshot is sorted by.
//! - [`Field`] and [`FieldList`] describe which columns a snapshot carries and
//!   in which order; the header's list governs both encoding and decoding.
//! - [`Header`] parses and renders the two header lines and decides whether a
//!   snapshot's schema version is supported.
//! - [`Record`] holds one path's values, with every optional column as an
//!   `Option` so "absent" survives a round trip.
//! - [`SnapshotReader`] streams [`LineEntry`] values that keep the raw line
//!   bytes next to the decoded record; [`SnapshotWriter`] emits a header
//!   followed by records or raw lines.
//!
//! # Invariants
//!
//! - Decoding is strict: any line that does not match the header's column
//!   layout is reported as [`SnapshotError::Malformed`] with its line number.
//! - Timestamps are second-resolution UTC (`YYYY-MM-DDTHH:MM:SSZ`).
//! - Paths containing `\`, TAB, or LF are escaped as `\\`, `\t`, `\n`.

mod error;
mod field;
mod header;
mod path;
mod reader;
mod record;
mod timestamp;
mod writer;

pub use error::{SnapshotError, UnknownFieldError};
pub use field::{Field, FieldList};
pub use header::{APP_NAME, CURRENT_VERSION, Header, MARKER};
pub use path::RepoPath;
pub use reader::{LineEntry, SnapshotReader};
pub use record::Record;
pub use timestamp::{format_timestamp, parse_timestamp};
pub use writer::SnapshotWriter;

/// File name of the snapshot at the repository root.
pub const DEFAULT_SNAPSHOT_FILE: &str = ".git_store_meta";
