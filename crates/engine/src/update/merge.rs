//! Combining baseline records with pending changes.

use snapshot::RepoPath;

/// One input to the merge, ordered by path and then by variant.
///
/// The declaration order of the variants is the order entries for the same
/// path are visited in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum MergeEntry {
    /// The path left the index.
    Deleted(RepoPath),
    /// The directory still exists; cancels an earlier deletion.
    Placeholder(RepoPath),
    /// The path must be re-read.
    Modified(RepoPath),
    /// Line carried over from the baseline snapshot.
    Baseline {
        /// Decoded path of the line.
        path: RepoPath,
        /// Line bytes without the newline.
        raw: Vec<u8>,
    },
}

impl MergeEntry {
    fn path(&self) -> &RepoPath {
        match self {
            Self::Deleted(path) | Self::Placeholder(path) | Self::Modified(path) => path,
            Self::Baseline { path, .. } => path,
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Deleted(_) => 0,
            Self::Placeholder(_) => 1,
            Self::Modified(_) => 2,
            Self::Baseline { .. } => 3,
        }
    }

    const fn is_pending(&self) -> bool {
        !matches!(self, Self::Baseline { .. })
    }
}

/// What the new snapshot holds for one path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Resolution {
    /// Re-read the path and record its current metadata.
    Refresh(RepoPath),
    /// Copy the baseline line unchanged.
    Keep(Vec<u8>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum GroupState {
    Open,
    Dropped,
    Done,
}

/// Resolves every path in `entries` to at most one output line.
///
/// Within a group of entries sharing a path the first decisive entry wins: a
/// deletion drops the path unless a placeholder follows, a modification
/// refreshes it, and a baseline line is kept as is. Output is in path order.
pub(crate) fn resolve(mut entries: Vec<MergeEntry>) -> Vec<Resolution> {
    entries.sort_by(|a, b| a.path().cmp(b.path()).then(a.rank().cmp(&b.rank())));
    entries.dedup_by(|next, previous| next.is_pending() && next == previous);

    let mut resolved = Vec::new();
    let mut current: Option<RepoPath> = None;
    let mut state = GroupState::Open;

    for entry in entries {
        if current.as_ref() != Some(entry.path()) {
            current = Some(entry.path().clone());
            state = GroupState::Open;
        }

        state = match (state, entry) {
            (GroupState::Done, _) => GroupState::Done,
            (GroupState::Dropped, MergeEntry::Placeholder(_)) => GroupState::Open,
            (GroupState::Dropped, _) => GroupState::Dropped,
            (GroupState::Open, MergeEntry::Deleted(_)) => GroupState::Dropped,
            (GroupState::Open, MergeEntry::Placeholder(_)) => GroupState::Open,
            (GroupState::Open, MergeEntry::Modified(path)) => {
                resolved.push(Resolution::Refresh(path));
                GroupState::Done
            }
            (GroupState::Open, MergeEntry::Baseline { raw, .. }) => {
                resolved.push(Resolution::Keep(raw));
                GroupState::Done
            }
        };
    }
    resolved
}
