use std::io;

/// Failures while querying git.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The git executable could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Program that was attempted.
        program: String,
        /// Error reported by the operating system.
        #[source]
        source: io::Error,
    },
    /// git ran but exited unsuccessfully.
    #[error("'{command}' failed ({status}): {stderr}")]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },
    /// The current directory is not the top level of the work tree.
    #[error("must run from the root of the working tree (top level is '{cdup}')")]
    NotAtRoot {
        /// Relative path git reported to the top level.
        cdup: String,
    },
    /// git printed output that should have been UTF-8 but was not.
    #[error("'{command}' printed non-UTF-8 output")]
    Utf8 {
        /// Rendered command line.
        command: String,
    },
}
