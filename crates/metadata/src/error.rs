use std::io;
use std::path::{Path, PathBuf};

/// Error produced when reading or writing filesystem metadata fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to {context} '{}': {source}", .path.display())]
pub struct MetadataError {
    context: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl MetadataError {
    /// Creates a new [`MetadataError`] from the supplied context, path, and source error.
    pub(crate) fn new(context: &'static str, path: &Path, source: io::Error) -> Self {
        Self {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns the operation being performed when the error occurred.
    #[must_use]
    pub const fn context(&self) -> &'static str {
        self.context
    }

    /// Returns the path involved in the failing operation.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying [`io::Error`] that triggered this failure.
    #[must_use]
    pub fn source_error(&self) -> &io::Error {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_action_and_path() {
        let error = MetadataError::new(
            "set mode",
            Path::new("dir/file.txt"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        let rendered = error.to_string();
        assert!(rendered.starts_with("failed to set mode 'dir/file.txt': "));
        assert_eq!(error.context(), "set mode");
        assert_eq!(error.source_error().kind(), io::ErrorKind::PermissionDenied);
    }
}
