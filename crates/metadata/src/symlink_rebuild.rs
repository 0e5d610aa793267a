//! Conversion of checked-out link stand-ins back into symbolic links.
//!
//! Checkouts made where symlinks are unavailable (`core.symlinks=false`)
//! leave a regular file whose content is the link target. The rebuild moves
//! that file into a private staging directory beside it, creates the link in
//! its place, and confirms the result is a link. If any step after the move
//! fails, the original file is moved back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::MetadataError;

/// Longest link target accepted from a stand-in (`PATH_MAX`).
const MAX_TARGET_LEN: u64 = 4096;

/// Replaces the regular file at `path` with a symlink to the target it holds.
///
/// Returns the link target. With `execute == false` only the stand-in is read
/// and validated. When the conversion fails the file at `path` keeps its
/// original content.
pub fn rebuild_symlink(path: &Path, execute: bool) -> Result<PathBuf, MetadataError> {
    rebuild_with(path, execute, create_symlink)
}

fn rebuild_with<F>(path: &Path, execute: bool, link: F) -> Result<PathBuf, MetadataError>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let length = fs::symlink_metadata(path)
        .map_err(|error| MetadataError::new("inspect link stand-in", path, error))?
        .len();
    if length > MAX_TARGET_LEN {
        return Err(MetadataError::new(
            "read link stand-in",
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{length} bytes is too long for a link target"),
            ),
        ));
    }
    let contents =
        fs::read(path).map_err(|error| MetadataError::new("read link stand-in", path, error))?;
    let target = target_from_bytes(contents)
        .map_err(|error| MetadataError::new("decode link target in", path, error))?;
    if !execute {
        return Ok(target);
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        MetadataError::new(
            "rebuild symlink",
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let staging = tempfile::Builder::new()
        .prefix(".git-store-meta-")
        .tempdir_in(parent)
        .map_err(|error| MetadataError::new("create staging directory for", path, error))?;
    let aside = staging.path().join(file_name);
    fs::rename(path, &aside)
        .map_err(|error| MetadataError::new("move aside link stand-in", path, error))?;

    let created = link(&target, path).and_then(|()| {
        if fs::symlink_metadata(path)?.file_type().is_symlink() {
            Ok(())
        } else {
            Err(io::Error::other("created entry is not a symlink"))
        }
    });

    if let Err(error) = created {
        if fs::symlink_metadata(path).is_ok() {
            // Whatever was left behind must go before the original returns.
            let _ = fs::remove_file(path);
        }
        if let Err(restore) = fs::rename(&aside, path) {
            let kept = staging.keep().join(file_name);
            return Err(MetadataError::new(
                "restore link stand-in, original kept at",
                &kept,
                restore,
            ));
        }
        return Err(MetadataError::new("rebuild symlink", path, error));
    }

    Ok(target)
}

fn target_from_bytes(contents: Vec<u8>) -> io::Result<PathBuf> {
    if contents.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "stand-in is empty",
        ));
    }
    if contents.contains(&0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "stand-in contains a NUL byte",
        ));
    }

    #[cfg(unix)]
    {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        Ok(PathBuf::from(OsString::from_vec(contents)))
    }

    #[cfg(not(unix))]
    {
        String::from_utf8(contents)
            .map(PathBuf::from)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
