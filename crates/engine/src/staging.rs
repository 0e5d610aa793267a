//! Staged replacement of snapshot files.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use snapshot::{Header, SnapshotWriter};

use crate::error::EngineError;

/// Writer handed to the closure that emits records.
pub(crate) type StagedWriter<'a> = SnapshotWriter<BufWriter<&'a mut fs::File>>;

/// Writes `header` plus whatever `emit` produces into a temporary file next
/// to `target`, then renames it over `target` when `persist` is set.
///
/// Returns the number of record lines written. The temporary file is removed
/// on every failure, and also when `persist` is false.
pub(crate) fn write_snapshot<F>(
    target: &Path,
    header: &Header,
    persist: bool,
    emit: F,
) -> Result<usize, EngineError>
where
    F: FnOnce(&mut StagedWriter<'_>) -> Result<(), EngineError>,
{
    let parent = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let existing = fs::metadata(target).ok().map(|metadata| metadata.permissions());
    let mut builder = tempfile::Builder::new();
    builder.prefix(".git-store-meta-").suffix(".tmp");
    #[cfg(unix)]
    if existing.is_none() {
        use std::os::unix::fs::PermissionsExt;
        // Opened as 0666 so the process umask decides the final mode.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder
        .tempfile_in(parent)
        .map_err(|error| EngineError::io("create staging file in", parent, error))?;

    let records = {
        let mut writer = SnapshotWriter::new(BufWriter::new(staged.as_file_mut()), header)
            .map_err(|error| EngineError::snapshot(target, error))?;
        emit(&mut writer)?;
        let records = writer.records_written();
        writer
            .finish()
            .map_err(|error| EngineError::snapshot(target, error))?;
        records
    };

    if persist {
        if let Some(permissions) = existing {
            fs::set_permissions(staged.path(), permissions)
                .map_err(|error| EngineError::io("set permissions of", staged.path(), error))?;
        }
        staged
            .persist(target)
            .map_err(|error| EngineError::io("replace", target, error.error))?;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapshot::FieldList;

    fn header() -> Header {
        Header::new(FieldList::canonical([]))
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".git-store-meta-"))
            .collect()
    }

    #[test]
    fn persists_complete_snapshot() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join(".git_store_meta");
        let written = write_snapshot(&target, &header(), true, |writer| {
            writer.write_raw(b"a\tf").map_err(|error| EngineError::snapshot(&target, error))
        })
        .expect("write");

        assert_eq!(written, 1);
        let text = fs::read_to_string(&target).expect("read");
        assert!(text.ends_with("<file>\t<type>\na\tf\n"));
        assert!(leftovers(temp.path()).is_empty());
    }

    #[test]
    fn failed_emit_keeps_previous_snapshot() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join(".git_store_meta");
        fs::write(&target, b"previous").expect("seed");

        let result = write_snapshot(&target, &header(), true, |_| {
            Err(EngineError::MissingBaseline {
                path: target.clone(),
            })
        });

        assert!(result.is_err());
        assert_eq!(fs::read(&target).expect("read"), b"previous");
        assert!(leftovers(temp.path()).is_empty());
    }

    #[test]
    fn dry_run_does_not_replace() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join(".git_store_meta");
        write_snapshot(&target, &header(), false, |_| Ok(())).expect("write");
        assert!(!target.exists());
        assert!(leftovers(temp.path()).is_empty());
    }

    /// Reads the process umask from `/proc`, where available.
    #[cfg(target_os = "linux")]
    fn current_umask() -> Option<u32> {
        let status = fs::read_to_string("/proc/self/status").ok()?;
        let value = status.lines().find_map(|line| line.strip_prefix("Umask:"))?;
        u32::from_str_radix(value.trim(), 8).ok()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn new_snapshot_mode_follows_umask() {
        use std::os::unix::fs::PermissionsExt;

        let Some(umask) = current_umask() else {
            return;
        };
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join(".git_store_meta");
        write_snapshot(&target, &header(), true, |_| Ok(())).expect("write");
        let mode = fs::metadata(&target).expect("stat").permissions().mode();
        assert_eq!(mode & 0o777, 0o666 & !umask);
    }

    #[cfg(unix)]
    #[test]
    fn replacement_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join(".git_store_meta");
        fs::write(&target, b"previous").expect("seed");
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).expect("chmod");

        write_snapshot(&target, &header(), true, |_| Ok(())).expect("write");
        let mode = fs::metadata(&target).expect("stat").permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
