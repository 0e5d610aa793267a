//! Run configuration shared by the engines.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use snapshot::{DEFAULT_SNAPSHOT_FILE, FieldList, RepoPath};

/// Settings for one store, update, or apply run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineOptions {
    snapshot_path: PathBuf,
    work_dir: PathBuf,
    fields: Option<FieldList>,
    directories: bool,
    dry_run: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            work_dir: PathBuf::from("."),
            fields: None,
            directories: false,
            dry_run: false,
        }
    }
}

impl EngineOptions {
    /// Starts a builder populated with the defaults.
    #[must_use]
    pub fn builder() -> EngineOptionsBuilder {
        EngineOptionsBuilder::default()
    }

    /// Snapshot path as configured, usually relative to the work tree.
    #[must_use]
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Snapshot path resolved against the work tree.
    #[must_use]
    pub fn snapshot_file(&self) -> Cow<'_, Path> {
        if self.snapshot_path.is_absolute() {
            Cow::Borrowed(&self.snapshot_path)
        } else {
            Cow::Owned(self.work_dir.join(&self.snapshot_path))
        }
    }

    /// Snapshot location as a repository path, when it lies inside the work tree.
    #[must_use]
    pub fn snapshot_repo_path(&self) -> Option<RepoPath> {
        let relative = if self.snapshot_path.is_absolute() {
            self.snapshot_path.strip_prefix(&self.work_dir).ok()?
        } else {
            self.snapshot_path.as_path()
        };
        let relative = relative.strip_prefix(".").unwrap_or(relative);
        if relative.as_os_str().is_empty() {
            return None;
        }
        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;
            Some(RepoPath::from_bytes(relative.as_os_str().as_bytes().to_vec()))
        }
        #[cfg(not(unix))]
        {
            let text = relative.to_string_lossy().replace('\\', "/");
            Some(RepoPath::from(text.as_str()))
        }
    }

    /// Explicit field selection, if any.
    #[must_use]
    pub const fn fields(&self) -> Option<&FieldList> {
        self.fields.as_ref()
    }

    /// Whether directories are recorded and restored.
    #[must_use]
    pub const fn directories(&self) -> bool {
        self.directories
    }

    /// Whether the run must leave the filesystem untouched.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Absolute location of a tracked path.
    pub(crate) fn resolve(&self, path: &RepoPath) -> PathBuf {
        self.work_dir.join(path.to_path())
    }
}

/// Builder for [`EngineOptions`].
#[derive(Clone, Debug, Default)]
pub struct EngineOptionsBuilder {
    options: EngineOptions,
}

impl EngineOptionsBuilder {
    /// Sets the snapshot file.
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.snapshot_path = path.into();
        self
    }

    /// Sets the work tree root.
    pub fn work_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.work_dir = path.into();
        self
    }

    /// Restricts the run to an explicit field selection.
    pub fn fields(mut self, fields: Option<FieldList>) -> Self {
        self.options.fields = fields;
        self
    }

    /// Includes directories.
    pub const fn directories(mut self, enabled: bool) -> Self {
        self.options.directories = enabled;
        self
    }

    /// Selects dry-run mode.
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.options.dry_run = enabled;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> EngineOptions {
        self.options
    }
}
