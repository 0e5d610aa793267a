//! Installation of git hooks that keep the snapshot current.
//!
//! `pre-commit` refreshes the snapshot (or creates it on first use) and
//! stages it; `post-checkout` and `post-merge` apply it. Hooks carry a marker
//! line so later installs replace them, while hooks written by anything else
//! are left alone.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use logging::targets;

/// Line identifying hooks written by this program.
pub(crate) const HOOK_MARKER: &str = "# generated by git-store-meta";

const HOOK_NAMES: [&str; 3] = ["pre-commit", "post-checkout", "post-merge"];

/// Failure while installing hooks.
#[derive(Debug, thiserror::Error)]
pub(crate) enum HookError {
    #[error("failed to {context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HookError {
    fn io(context: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Options forwarded to the commands the hooks run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct HookFlags {
    pub(crate) fields: Option<String>,
    pub(crate) directories: bool,
    pub(crate) target: Option<PathBuf>,
}

impl HookFlags {
    fn render(&self) -> String {
        let mut rendered = String::new();
        if let Some(fields) = &self.fields {
            rendered.push_str(" -f ");
            rendered.push_str(&shell_quote(fields));
        }
        if self.directories {
            rendered.push_str(" -d");
        }
        if let Some(target) = &self.target {
            rendered.push_str(" -t ");
            rendered.push_str(&shell_quote(&target.to_string_lossy()));
        }
        rendered
    }

    fn target_quoted(&self) -> String {
        match &self.target {
            Some(target) => shell_quote(&target.to_string_lossy()),
            None => shell_quote(snapshot::DEFAULT_SNAPSHOT_FILE),
        }
    }
}

/// Hooks written and hooks left in place.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct InstallSummary {
    pub(crate) installed: Vec<&'static str>,
    pub(crate) skipped: Vec<&'static str>,
}

/// Writes the hooks into `hooks_dir`.
pub(crate) fn install(
    hooks_dir: &Path,
    flags: &HookFlags,
    dry_run: bool,
) -> Result<InstallSummary, HookError> {
    if !dry_run {
        fs::create_dir_all(hooks_dir)
            .map_err(|error| HookError::io("create hooks directory", hooks_dir, error))?;
    }

    let mut summary = InstallSummary::default();
    for name in HOOK_NAMES {
        let path = hooks_dir.join(name);
        if is_foreign(&path)? {
            tracing::warn!(
                target: targets::HOOKS,
                "'{}' exists and was not generated by git-store-meta, skip installing it",
                path.display()
            );
            summary.skipped.push(name);
            continue;
        }

        if dry_run {
            tracing::info!(target: targets::HOOKS, "would install '{}'", path.display());
        } else {
            write_hook(&path, &script(name, flags))?;
            tracing::info!(target: targets::HOOKS, "installed '{}'", path.display());
        }
        summary.installed.push(name);
    }
    Ok(summary)
}

fn is_foreign(path: &Path) -> Result<bool, HookError> {
    match fs::read(path) {
        Ok(contents) => {
            let marker = HOOK_MARKER.as_bytes();
            Ok(!contents.windows(marker.len()).any(|window| window == marker))
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(HookError::io("read hook", path, error)),
    }
}

fn write_hook(path: &Path, contents: &str) -> Result<(), HookError> {
    fs::write(path, contents).map_err(|error| HookError::io("write hook", path, error))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|error| HookError::io("make executable", path, error))?;
    }
    Ok(())
}

/// Renders the script for hook `name`.
pub(crate) fn script(name: &str, flags: &HookFlags) -> String {
    let options = flags.render();
    let body = match name {
        "pre-commit" => format!(
            "# record metadata of the staged changes and stage the snapshot\n\
             if [ -f {target} ]; then\n\
             \tgit-store-meta --update{options} || exit 1\n\
             else\n\
             \tgit-store-meta --store{options} || exit 1\n\
             fi\n\
             git add {target} || exit 1\n",
            target = flags.target_quoted(),
        ),
        _ => format!("# restore the recorded metadata\ngit-store-meta --apply{options}\n"),
    };
    format!(
        "#!/bin/sh\n{HOOK_MARKER} {}\n{body}",
        snapshot::CURRENT_VERSION
    )
}

fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || b"-_./,+=:".contains(&byte))
    {
        return value.to_owned();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
