use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use snapshot::RepoPath;

use crate::change::{StagedChange, parse_name_status};
use crate::error::VcsError;
use crate::Repository;

/// Environment variable overriding the git executable.
pub const GIT_PROGRAM_ENV: &str = "GIT_STORE_META_GIT";

/// Object id of the empty tree, compared against before the first commit.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// [`Repository`] backed by the `git` executable.
#[derive(Clone, Debug)]
pub struct GitRepository {
    program: OsString,
    work_dir: PathBuf,
}

impl GitRepository {
    /// Repository whose work tree is `work_dir`, using `git` from `PATH`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: OsString::from("git"),
            work_dir: work_dir.into(),
        }
    }

    /// Replaces the git executable.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Fails with [`VcsError::NotAtRoot`] unless the work directory is the
    /// top level of the work tree.
    pub fn ensure_at_root(&self) -> Result<(), VcsError> {
        let args = ["rev-parse", "--show-cdup"];
        let output = self.run(&args)?;
        let cdup = self.utf8(&args, output)?;
        let cdup = cdup.trim();
        if cdup.is_empty() {
            Ok(())
        } else {
            Err(VcsError::NotAtRoot {
                cdup: cdup.to_owned(),
            })
        }
    }

    /// Location of the hooks directory, honoring `core.hooksPath`.
    pub fn hooks_dir(&self) -> Result<PathBuf, VcsError> {
        let args = ["rev-parse", "--git-path", "hooks"];
        let output = self.run(&args)?;
        let text = self.utf8(&args, output)?;
        let path = Path::new(text.trim_end_matches(['\n', '\r']));
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        })
    }

    fn has_head(&self) -> Result<bool, VcsError> {
        let args = ["rev-parse", "--verify", "-q", "HEAD"];
        logging::trace_git!("running {}", self.render(&args));
        let status = self
            .command(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| self.spawn_error(source))?;
        Ok(status.success())
    }

    fn command<S: AsRef<OsStr>>(&self, args: &[S]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(args).current_dir(&self.work_dir);
        command
    }

    fn run<S: AsRef<OsStr>>(&self, args: &[S]) -> Result<Vec<u8>, VcsError> {
        let rendered = self.render(args);
        logging::trace_git!("running {rendered}");
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| self.spawn_error(source))?;
        if !output.status.success() {
            return Err(VcsError::Failed {
                command: rendered,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        logging::trace_git!("{rendered} printed {} bytes", output.stdout.len());
        Ok(output.stdout)
    }

    fn utf8<S: AsRef<OsStr>>(&self, args: &[S], bytes: Vec<u8>) -> Result<String, VcsError> {
        String::from_utf8(bytes).map_err(|_| VcsError::Utf8 {
            command: self.render(args),
        })
    }

    fn render<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        let mut rendered = self.program.to_string_lossy().into_owned();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(&arg.as_ref().to_string_lossy());
        }
        rendered
    }

    fn spawn_error(&self, source: std::io::Error) -> VcsError {
        VcsError::Spawn {
            program: self.program.to_string_lossy().into_owned(),
            source,
        }
    }
}

impl Repository for GitRepository {
    fn tracked_files(&self) -> Result<Vec<RepoPath>, VcsError> {
        let output = self.run(&["ls-files", "-z"])?;
        Ok(split_nul(&output))
    }

    fn staged_changes(&self) -> Result<Vec<StagedChange>, VcsError> {
        let base = if self.has_head()? { "HEAD" } else { EMPTY_TREE };
        let output = self.run(&[
            "diff",
            "--cached",
            "--name-status",
            "--no-renames",
            "-z",
            base,
        ])?;
        Ok(parse_name_status(&output))
    }

    fn is_tracked(&self, path: &Path) -> Result<bool, VcsError> {
        let args: [&OsStr; 5] = [
            OsStr::new("--literal-pathspecs"),
            OsStr::new("ls-files"),
            OsStr::new("-z"),
            OsStr::new("--"),
            path.as_os_str(),
        ];
        let output = self.run(&args)?;
        Ok(!output.is_empty())
    }
}

fn split_nul(output: &[u8]) -> Vec<RepoPath> {
    output
        .split(|&byte| byte == 0)
        .filter(|token| !token.is_empty())
        .map(|token| RepoPath::from_bytes(token.to_vec()))
        .collect()
}
