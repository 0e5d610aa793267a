#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `metadata` reads and writes the attributes a git-store-meta snapshot
//! records for each tracked path: object type, modification and access time,
//! permission bits, and owning user and group.
//!
//! # Design
//!
//! - [`MetadataAccessor::read`] performs an `lstat` of one path and returns an
//!   [`EntryMetadata`], or `None` when the path vanished or is not a regular
//!   file, directory, or symbolic link.
//! - [`MetadataWriter`] applies one attribute at a time. Every operation that
//!   may touch a symbolic link takes a `follow_symlinks` switch so links are
//!   changed themselves rather than their targets. A writer created with
//!   `execute == false` validates the path and returns success without
//!   touching the filesystem.
//! - [`IdLookup`] resolves numeric ids to names and back through a cached
//!   user/group database.
//! - [`rebuild_symlink`] converts a plain file holding a link target back into
//!   a symbolic link, restoring the original file when conversion fails.
//!
//! # Errors
//!
//! Failures are reported as [`MetadataError`] values carrying the attempted
//! action, the path, and the underlying [`std::io::Error`].

mod apply;
mod entry;
mod error;
mod kind;
mod symlink_rebuild;

#[cfg(unix)]
mod id_lookup;
#[cfg(not(unix))]
#[path = "id_lookup_stub.rs"]
mod id_lookup;

#[cfg(unix)]
mod ownership;

pub use apply::MetadataWriter;
pub use entry::{EntryMetadata, MetadataAccessor, probe_kind};
pub use error::MetadataError;
pub use id_lookup::IdLookup;
pub use kind::FileKind;
pub use symlink_rebuild::rebuild_symlink;
