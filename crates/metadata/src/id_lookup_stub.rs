//! No-op user/group lookups for platforms without a Unix account database.
//!
//! Every lookup reports "unknown" so callers fall back to numeric ids.

/// Resolves numeric ids to names and names back to ids.
#[derive(Debug, Default)]
pub struct IdLookup;

impl IdLookup {
    /// Creates the lookup.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Always `None` on this platform.
    pub fn user_name(&self, _uid: u32) -> Option<String> {
        None
    }

    /// Always `None` on this platform.
    pub fn group_name(&self, _gid: u32) -> Option<String> {
        None
    }

    /// Always `None` on this platform.
    pub fn uid_for_name(&self, _name: &str) -> Option<u32> {
        None
    }

    /// Always `None` on this platform.
    pub fn gid_for_name(&self, _name: &str) -> Option<u32> {
        None
    }
}
