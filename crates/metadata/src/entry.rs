use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;

use crate::error::MetadataError;
use crate::id_lookup::IdLookup;
use crate::kind::FileKind;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Attributes of one filesystem object as observed by `lstat`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryMetadata {
    /// Object type.
    pub kind: FileKind,
    /// Modification time in whole seconds since the Unix epoch.
    pub mtime: i64,
    /// Access time in whole seconds since the Unix epoch.
    pub atime: i64,
    /// Permission, setuid, setgid, and sticky bits (`mode & 0o7777`).
    pub mode: u32,
    /// Numeric owner.
    pub uid: u32,
    /// Numeric group.
    pub gid: u32,
    /// Owner name, when the account database resolves `uid`.
    pub user: Option<String>,
    /// Group name, when the account database resolves `gid`.
    pub group: Option<String>,
}

/// Reads snapshot attributes for individual paths.
#[derive(Default)]
pub struct MetadataAccessor {
    ids: IdLookup,
}

impl MetadataAccessor {
    /// Creates an accessor with an empty name cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the attributes of `path` without following a final symlink.
    ///
    /// Returns `Ok(None)` when the path does not exist or is a device, socket,
    /// or fifo. Every other failure, permission denied included, is an error.
    pub fn read(&self, path: &Path) -> Result<Option<EntryMetadata>, MetadataError> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(MetadataError::new("read metadata of", path, error)),
        };
        let Some(kind) = FileKind::from_file_type(metadata.file_type()) else {
            return Ok(None);
        };

        let (mode, uid, gid) = ownership_bits(&metadata, kind);
        Ok(Some(EntryMetadata {
            kind,
            mtime: FileTime::from_last_modification_time(&metadata).unix_seconds(),
            atime: FileTime::from_last_access_time(&metadata).unix_seconds(),
            mode,
            uid,
            gid,
            user: self.ids.user_name(uid),
            group: self.ids.group_name(gid),
        }))
    }
}

/// Reports the current type of `path`.
///
/// `Ok(None)` means the path exists but has an unsupported type; a missing
/// path is reported as a `NotFound` error. Dangling symlinks exist.
pub fn probe_kind(path: &Path) -> io::Result<Option<FileKind>> {
    fs::symlink_metadata(path).map(|metadata| FileKind::from_file_type(metadata.file_type()))
}

#[cfg(unix)]
fn ownership_bits(metadata: &fs::Metadata, _kind: FileKind) -> (u32, u32, u32) {
    (metadata.mode() & 0o7777, metadata.uid(), metadata.gid())
}

#[cfg(not(unix))]
fn ownership_bits(metadata: &fs::Metadata, kind: FileKind) -> (u32, u32, u32) {
    let base = match kind {
        FileKind::Directory | FileKind::Symlink => 0o755,
        FileKind::File => 0o644,
    };
    let mode = if metadata.permissions().readonly() {
        base & !0o222
    } else {
        base
    };
    (mode, 0, 0)
}
