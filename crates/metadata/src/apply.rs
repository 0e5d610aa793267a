use std::fs;
#[cfg(not(unix))]
use std::io;
use std::path::Path;

use filetime::{FileTime, set_file_times, set_symlink_file_times};

use crate::error::MetadataError;

#[cfg(unix)]
use crate::ownership;

/// Writes individual attributes onto filesystem paths.
///
/// A writer built with `execute == false` performs a dry run: each operation
/// checks that the path exists and then reports success without mutating
/// anything.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MetadataWriter {
    execute: bool,
}

impl MetadataWriter {
    /// Creates a writer; `execute == false` selects dry-run mode.
    #[must_use]
    pub const fn new(execute: bool) -> Self {
        Self { execute }
    }

    /// Reports whether this writer only validates.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        !self.execute
    }

    /// Sets the owner and/or group of `path`.
    ///
    /// With `follow_symlinks == false` a symbolic link is changed itself.
    pub fn set_owner(
        &self,
        path: &Path,
        uid: Option<u32>,
        gid: Option<u32>,
        follow_symlinks: bool,
    ) -> Result<(), MetadataError> {
        if uid.is_none() && gid.is_none() {
            return Ok(());
        }
        if !self.execute {
            return validate(path, "change ownership of");
        }

        #[cfg(unix)]
        {
            ownership::change_owner(path, uid, gid, follow_symlinks)
                .map_err(|error| MetadataError::new("change ownership of", path, error))
        }

        #[cfg(not(unix))]
        {
            let _ = follow_symlinks;
            Err(MetadataError::new(
                "change ownership of",
                path,
                io::Error::new(
                    io::ErrorKind::Unsupported,
                    "changing ownership is not supported on this platform",
                ),
            ))
        }
    }

    /// Sets the permission bits of `path` (`mode & 0o7777`).
    ///
    /// The call follows symlinks; callers never pass a link here.
    pub fn set_mode(&self, path: &Path, mode: u32) -> Result<(), MetadataError> {
        if !self.execute {
            return validate(path, "change mode of");
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
                .map_err(|error| MetadataError::new("change mode of", path, error))
        }

        #[cfg(not(unix))]
        {
            let mut permissions = fs::metadata(path)
                .map_err(|error| MetadataError::new("inspect permissions of", path, error))?
                .permissions();
            permissions.set_readonly(mode & 0o222 == 0);
            fs::set_permissions(path, permissions)
                .map_err(|error| MetadataError::new("change mode of", path, error))
        }
    }

    /// Sets the modification and/or access time of `path` in epoch seconds.
    ///
    /// A timestamp passed as `None` keeps its current value. With
    /// `follow_symlinks == false` the link's own times are changed.
    pub fn set_times(
        &self,
        path: &Path,
        mtime: Option<i64>,
        atime: Option<i64>,
        follow_symlinks: bool,
    ) -> Result<(), MetadataError> {
        if mtime.is_none() && atime.is_none() {
            return Ok(());
        }
        if !self.execute {
            return validate(path, "set timestamps of");
        }

        let current = if follow_symlinks {
            fs::metadata(path)
        } else {
            fs::symlink_metadata(path)
        }
        .map_err(|error| MetadataError::new("inspect timestamps of", path, error))?;

        let accessed = atime.map_or_else(
            || FileTime::from_last_access_time(&current),
            |seconds| FileTime::from_unix_time(seconds, 0),
        );
        let modified = mtime.map_or_else(
            || FileTime::from_last_modification_time(&current),
            |seconds| FileTime::from_unix_time(seconds, 0),
        );

        if follow_symlinks {
            set_file_times(path, accessed, modified)
        } else {
            set_symlink_file_times(path, accessed, modified)
        }
        .map_err(|error| MetadataError::new("set timestamps of", path, error))
    }
}

fn validate(path: &Path, context: &'static str) -> Result<(), MetadataError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(()),
        Err(error) => Err(MetadataError::new(context, path, error)),
    }
}
