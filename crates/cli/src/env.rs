use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use vcs::GIT_PROGRAM_ENV;

/// Environment variable naming the default snapshot file.
pub(crate) const TARGET_ENV: &str = "GIT_STORE_META_TARGET";

pub(crate) fn env_target_default() -> Option<PathBuf> {
    non_empty(env::var_os(TARGET_ENV)).map(PathBuf::from)
}

pub(crate) fn env_git_program() -> Option<OsString> {
    non_empty(env::var_os(GIT_PROGRAM_ENV))
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|value| !value.to_string_lossy().trim().is_empty())
}
