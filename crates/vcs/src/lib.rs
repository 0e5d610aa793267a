#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `vcs` answers the questions git-store-meta asks of the version control
//! system: which paths are tracked, which changes are staged for the next
//! commit, whether a given file is tracked, and where hooks live.
//!
//! # Design
//!
//! - [`Repository`] is the seam the engines depend on, so their tests can
//!   substitute an in-memory repository.
//! - [`GitRepository`] implements it by running the `git` executable with
//!   NUL-terminated output (`-z`) and parsing the raw bytes into
//!   [`RepoPath`](snapshot::RepoPath) values; paths are never re-encoded.
//! - Every invocation is recorded as a debug event on the
//!   [`logging::targets::GIT`] target.

mod change;
mod error;
mod git;

pub use change::{ChangeKind, StagedChange, parse_name_status};
pub use error::VcsError;
pub use git::{EMPTY_TREE, GIT_PROGRAM_ENV, GitRepository};

use std::collections::BTreeSet;
use std::path::Path;

use snapshot::RepoPath;

/// Read-only view of a repository's index used by the engines.
pub trait Repository {
    /// Every path recorded in the index.
    fn tracked_files(&self) -> Result<Vec<RepoPath>, VcsError>;

    /// Changes staged relative to `HEAD`, or to the empty tree before the
    /// first commit.
    fn staged_changes(&self) -> Result<Vec<StagedChange>, VcsError>;

    /// Reports whether `path`, relative to the work tree, is in the index.
    fn is_tracked(&self, path: &Path) -> Result<bool, VcsError>;

    /// Every directory that contains a tracked path, sorted and deduplicated.
    fn tracked_directories(&self) -> Result<Vec<RepoPath>, VcsError> {
        Ok(directories_of(&self.tracked_files()?))
    }
}

/// Collects the ancestor directories of `paths` in byte order.
pub fn directories_of(paths: &[RepoPath]) -> Vec<RepoPath> {
    let mut directories = BTreeSet::new();
    for path in paths {
        for ancestor in path.ancestors() {
            if !directories.insert(ancestor) {
                // Shallower ancestors were inserted along with this one.
                break;
            }
        }
    }
    directories.into_iter().collect()
}
