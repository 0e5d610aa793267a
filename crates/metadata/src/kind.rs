use std::fs::FileType;

/// Filesystem object types a snapshot can describe.
///
/// Devices, sockets, and fifos have no variant; they are never recorded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link, described by itself rather than its target.
    Symlink,
}

impl FileKind {
    /// Classifies a [`FileType`] obtained from `lstat`.
    #[must_use]
    pub fn from_file_type(file_type: FileType) -> Option<Self> {
        if file_type.is_symlink() {
            Some(Self::Symlink)
        } else if file_type.is_dir() {
            Some(Self::Directory)
        } else if file_type.is_file() {
            Some(Self::File)
        } else {
            None
        }
    }

    /// Human-readable name used in diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_files_and_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("file.txt");
        fs::write(&file, b"data").expect("write");

        let file_type = fs::symlink_metadata(&file).expect("lstat").file_type();
        assert_eq!(FileKind::from_file_type(file_type), Some(FileKind::File));

        let dir_type = fs::symlink_metadata(temp.path()).expect("lstat").file_type();
        assert_eq!(FileKind::from_file_type(dir_type), Some(FileKind::Directory));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path(), &link).expect("symlink");

        let file_type = fs::symlink_metadata(&link).expect("lstat").file_type();
        assert_eq!(FileKind::from_file_type(file_type), Some(FileKind::Symlink));
        assert_eq!(FileKind::Symlink.describe(), "symlink");
    }
}
