#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` implements the three snapshot operations of git-store-meta:
//!
//! - [`store`] records every tracked path into a fresh snapshot.
//! - [`update`] refreshes an existing snapshot from the staged change list,
//!   re-reading only the paths that changed.
//! - [`apply`] writes recorded metadata back onto the working tree.
//!
//! # Design
//!
//! Each operation takes an explicit [`EngineOptions`] value and, where it
//! needs one, a [`vcs::Repository`]. Snapshots are never rewritten in place:
//! the new content is staged in a temporary file beside the target and
//! renamed over it once complete, so a failed run leaves the previous
//! snapshot untouched.
//!
//! Problems with individual paths during [`apply`] are reported as
//! `tracing` warnings and counted in the [`ApplySummary`]; only failures that
//! make the whole run meaningless surface as [`EngineError`].
//!
//! # Examples
//!
//! ```no_run
//! use engine::{EngineOptions, store};
//! use vcs::GitRepository;
//!
//! let options = EngineOptions::builder().work_dir(".").directories(true).build();
//! let repo = GitRepository::new(".");
//! let summary = store(&repo, &options).expect("store");
//! println!("recorded {} paths", summary.records);
//! ```

mod apply;
mod baseline;
mod error;
mod options;
mod staging;
mod store;
mod update;

pub use apply::{ApplySummary, apply};
pub use error::EngineError;
pub use options::{EngineOptions, EngineOptionsBuilder};
pub use store::{StoreSummary, store};
pub use update::{UpdateSummary, update};
