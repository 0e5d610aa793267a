//! Cached user and group database lookups.

use uzers::{Groups, Users, UsersCache};

/// Resolves numeric ids to names and names back to ids.
///
/// Results are cached for the lifetime of the value, so one lookup object is
/// shared across a whole store or apply run.
pub struct IdLookup {
    cache: UsersCache,
}

impl IdLookup {
    /// Creates an empty lookup cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: UsersCache::new(),
        }
    }

    /// Returns the name of the user with `uid`, if the database knows it.
    pub fn user_name(&self, uid: u32) -> Option<String> {
        self.cache
            .get_user_by_uid(uid)
            .map(|user| user.name().to_string_lossy().into_owned())
    }

    /// Returns the name of the group with `gid`, if the database knows it.
    pub fn group_name(&self, gid: u32) -> Option<String> {
        self.cache
            .get_group_by_gid(gid)
            .map(|group| group.name().to_string_lossy().into_owned())
    }

    /// Returns the uid registered for `name`.
    pub fn uid_for_name(&self, name: &str) -> Option<u32> {
        self.cache.get_user_by_name(name).map(|user| user.uid())
    }

    /// Returns the gid registered for `name`.
    pub fn gid_for_name(&self, name: &str) -> Option<u32> {
        self.cache.get_group_by_name(name).map(|group| group.gid())
    }
}

impl Default for IdLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_resolves_both_ways() {
        let lookup = IdLookup::new();
        let Some(name) = lookup.user_name(0) else {
            return;
        };
        assert_eq!(lookup.uid_for_name(&name), Some(0));
    }

    #[test]
    fn unknown_names_are_unresolved() {
        let lookup = IdLookup::new();
        assert_eq!(lookup.uid_for_name("no-such-user-for-git-store-meta"), None);
        assert_eq!(lookup.gid_for_name("no-such-group-for-git-store-meta"), None);
    }
}
