#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` implements the command-line front-end of `git-store-meta`. It parses
//! the action flags (`--store`, `--update`, `--apply`, `--install`) and their
//! options, checks that it runs at the top of a git work tree, and delegates
//! to the [`engine`] crate.
//!
//! # Design
//!
//! [`run`] accepts an argument iterator together with standard output and
//! standard error handles so tests can drive the whole program in-process.
//! Diagnostics are rendered by the [`logging`] crate: a dispatcher writing to
//! the supplied stderr handle is installed for the duration of the call.
//!
//! # Errors
//!
//! Every failure is reported as a single `error: ...` line and mapped to an
//! exit status. A missing action is also followed by the usage text.
//!
//!
//! | status | meaning |
//! |--------|---------|
//! | 0 | success |
//! | 1 | bad arguments or an unusable field selection |
//! | 2 | not at the work tree root, or git is unavailable |
//! | 3 | malformed snapshot |
//! | 4 | unsupported snapshot schema |
//! | 5 | any other runtime failure |
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let status = cli::run(["git-store-meta", "--help"], &mut stdout, std::io::sink());
//!
//! assert_eq!(status, 0);
//! assert!(String::from_utf8_lossy(&stdout).contains("--store"));
//! ```

mod arguments;
mod env;
mod hooks;

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use engine::{EngineError, EngineOptions};
use logging::{DiagnosticSink, Verbosity};
use snapshot::{DEFAULT_SNAPSHOT_FILE, FieldList, SnapshotError};
use vcs::GitRepository;

use arguments::{Action, ParsedArgs, parse_args};
use hooks::HookFlags;

/// Successful completion.
pub const EXIT_OK: i32 = 0;
/// Invalid command line or field selection.
pub const EXIT_USAGE: i32 = 1;
/// Not at the top of a work tree, or git could not be run.
pub const EXIT_SETUP: i32 = 2;
/// The snapshot does not follow the file format.
pub const EXIT_MALFORMED: i32 = 3;
/// The snapshot was written with an unsupported schema version.
pub const EXIT_UNSUPPORTED: i32 = 4;
/// Any other failure.
pub const EXIT_FAILURE: i32 = 5;

/// Help text printed by `--help`.
pub const HELP_TEXT: &str = concat!(
    "Usage: git-store-meta ACTION [OPTION...]\n",
    "Store, update, or apply metadata of files tracked by git.\n",
    "\n",
    "Actions:\n",
    "  -s, --store           Store the metadata of all tracked files.\n",
    "  -u, --update          Update the metadata of staged changes.\n",
    "  -a, --apply           Apply the stored metadata to the working tree.\n",
    "  -i, --install         Install hooks that update the metadata on commit\n",
    "                        and apply it after checkout and merge.\n",
    "  -h, --help            Show this help message and exit.\n",
    "\n",
    "Options:\n",
    "  -f, --field FIELDS    Comma-separated fields to store or apply:\n",
    "                        mtime, atime, mode, uid, gid, user, group.\n",
    "                        file and type are always recorded.\n",
    "  -d, --directory       Also store, update, or apply directories.\n",
    "  -n, --dry-run         Report what would change without changing it.\n",
    "  -v, --verbose         Print every action; repeat for debug output.\n",
    "  -t, --target FILE     Snapshot file to use (default: .git_store_meta,\n",
    "                        or $GIT_STORE_META_TARGET when set).\n",
    "\n",
    "git-store-meta must be run from the top level of the working tree.\n",
);

const USAGE_HINT: &str = "no action given; try 'git-store-meta --help'";

/// Runs the program from the current directory.
///
/// Returns the process exit status; see the crate documentation for the
/// meaning of each value.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write + Send + 'static,
{
    let sink = DiagnosticSink::new(stderr);
    match std::env::current_dir() {
        Ok(work_dir) => run_with_sink(arguments, &work_dir, stdout, sink),
        Err(error) => {
            report(&sink, &format!("failed to read the current directory: {error}"));
            EXIT_SETUP
        }
    }
}

/// Runs the program as if started in `work_dir`.
pub fn run_in<I, S, Out, Err>(arguments: I, work_dir: &Path, stdout: &mut Out, stderr: Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write + Send + 'static,
{
    run_with_sink(arguments, work_dir, stdout, DiagnosticSink::new(stderr))
}

fn run_with_sink<I, S, Out>(arguments: I, work_dir: &Path, stdout: &mut Out, sink: DiagnosticSink) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
{
    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => {
            let rendered = error.to_string();
            let message = rendered.trim_end();
            report(&sink, message.strip_prefix("error: ").unwrap_or(message));
            return EXIT_USAGE;
        }
    };

    let action = parsed.action();
    match action {
        Action::Help => {
            if stdout.write_all(HELP_TEXT.as_bytes()).and_then(|()| stdout.flush()).is_err() {
                return EXIT_FAILURE;
            }
            return EXIT_OK;
        }
        Action::None => {
            report(&sink, USAGE_HINT);
            let _ = sink.write_line(HELP_TEXT.trim_end());
            return EXIT_USAGE;
        }
        Action::Store | Action::Update | Action::Apply | Action::Install => {}
    }

    let verbosity = Verbosity::from_verbose_level(parsed.verbose);
    let dispatch = logging::dispatch(verbosity, sink.clone());
    tracing::dispatcher::with_default(&dispatch, || execute(action, &parsed, work_dir, &sink))
}

fn execute(action: Action, parsed: &ParsedArgs, work_dir: &Path, sink: &DiagnosticSink) -> i32 {
    let fields = match parsed.fields.as_deref().map(FieldList::parse_selection).transpose() {
        Ok(fields) => fields,
        Err(error) => {
            report(sink, &error.to_string());
            return EXIT_USAGE;
        }
    };

    let mut repo = GitRepository::new(work_dir);
    if let Some(program) = env::env_git_program() {
        repo = repo.with_program(program);
    }
    if let Err(error) = repo.ensure_at_root() {
        report(sink, &error.to_string());
        return EXIT_SETUP;
    }

    let target = parsed
        .target
        .clone()
        .or_else(env::env_target_default)
        .unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.into());
    let options = EngineOptions::builder()
        .snapshot_path(target)
        .work_dir(work_dir)
        .fields(fields)
        .directories(parsed.directories)
        .dry_run(parsed.dry_run)
        .build();

    let outcome = match action {
        Action::Store => engine::store(&repo, &options).map(|_| ()),
        Action::Update => engine::update(&repo, &options).map(|_| ()),
        Action::Apply => engine::apply(&options).map(|_| ()),
        Action::Install => return install(&repo, parsed, sink),
        Action::Help | Action::None => return EXIT_USAGE,
    };

    match outcome {
        Ok(()) => EXIT_OK,
        Err(error) => {
            report(sink, &error.to_string());
            exit_code_for(&error)
        }
    }
}

fn install(repo: &GitRepository, parsed: &ParsedArgs, sink: &DiagnosticSink) -> i32 {
    let hooks_dir = match repo.hooks_dir() {
        Ok(dir) => dir,
        Err(error) => {
            report(sink, &error.to_string());
            return EXIT_SETUP;
        }
    };
    let flags = HookFlags {
        fields: parsed.fields.clone(),
        directories: parsed.directories,
        target: parsed.target.clone(),
    };
    match hooks::install(&hooks_dir, &flags, parsed.dry_run) {
        Ok(summary) => {
            tracing::debug!(
                target: logging::targets::HOOKS,
                "{} hooks installed, {} left in place",
                summary.installed.len(),
                summary.skipped.len()
            );
            EXIT_OK
        }
        Err(error) => {
            report(sink, &error.to_string());
            EXIT_FAILURE
        }
    }
}

/// Maps an engine failure to the process exit status.
fn exit_code_for(error: &EngineError) -> i32 {
    match error {
        EngineError::FieldMismatch { .. } => EXIT_USAGE,
        _ => match error.snapshot_error() {
            Some(SnapshotError::Malformed { .. }) => EXIT_MALFORMED,
            Some(SnapshotError::UnsupportedSchema { .. }) => EXIT_UNSUPPORTED,
            _ => EXIT_FAILURE,
        },
    }
}

fn report(sink: &DiagnosticSink, message: &str) {
    let _ = sink.write_line(&format!("error: {message}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn snapshot_error(source: SnapshotError) -> EngineError {
        EngineError::Snapshot {
            path: PathBuf::from(".git_store_meta"),
            source,
        }
    }

    #[test]
    fn snapshot_failures_have_dedicated_codes() {
        let malformed = snapshot_error(SnapshotError::Malformed {
            line: 3,
            reason: "bad".to_owned(),
        });
        let unsupported = snapshot_error(SnapshotError::UnsupportedSchema {
            app: "git-store-meta".to_owned(),
            version: "2.0.0".to_owned(),
        });
        assert_eq!(exit_code_for(&malformed), EXIT_MALFORMED);
        assert_eq!(exit_code_for(&unsupported), EXIT_UNSUPPORTED);
    }

    #[test]
    fn field_mismatch_is_a_usage_error() {
        let error = EngineError::FieldMismatch {
            requested: "mtime".to_owned(),
            recorded: "mtime,mode".to_owned(),
        };
        assert_eq!(exit_code_for(&error), EXIT_USAGE);
    }

    #[test]
    fn other_failures_use_the_generic_code() {
        let error = EngineError::MissingBaseline {
            path: PathBuf::from(".git_store_meta"),
        };
        assert_eq!(exit_code_for(&error), EXIT_FAILURE);
    }

    #[test]
    fn help_lists_every_action() {
        for flag in ["--store", "--update", "--apply", "--install", "--help"] {
            assert!(HELP_TEXT.contains(flag), "{flag} missing from help");
        }
    }
}
