use std::borrow::Cow;
use std::fmt;
use std::path::Path;

/// Repository-relative path stored as raw bytes.
///
/// Ordering compares bytes, which is the collation snapshots are sorted by
/// regardless of the process locale.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RepoPath(Vec<u8>);

impl RepoPath {
    /// Wraps raw path bytes as reported by git.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw path bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the path as a filesystem path relative to the work tree.
    #[must_use]
    pub fn to_path(&self) -> Cow<'_, Path> {
        #[cfg(unix)]
        {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            Cow::Borrowed(Path::new(OsStr::from_bytes(&self.0)))
        }

        #[cfg(not(unix))]
        {
            match String::from_utf8_lossy(&self.0) {
                Cow::Borrowed(text) => Cow::Borrowed(Path::new(text)),
                Cow::Owned(text) => Cow::Owned(text.into()),
            }
        }
    }

    /// Returns every proper ancestor directory, nearest first.
    ///
    /// `a/b/c` yields `a/b` then `a`; a top-level path yields nothing.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        let mut end = self.0.len();
        std::iter::from_fn(move || {
            let slash = self.0[..end].iter().rposition(|&byte| byte == b'/')?;
            end = slash;
            (slash > 0).then(|| Self(self.0[..slash].to_vec()))
        })
    }
}

impl From<&str> for RepoPath {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
