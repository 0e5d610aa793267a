//! End-to-end tests running the `git-store-meta` binary inside scratch repositories.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use filetime::FileTime;
use predicates::prelude::*;
use snapshot::{Record, SnapshotReader};
use test_support::GitFixture;

const PROGRAM: &str = env!("CARGO_BIN_EXE_git-store-meta");

fn binary(dir: &Path) -> Command {
    let mut command = Command::new(PROGRAM);
    command
        .current_dir(dir)
        .env_remove("GIT_STORE_META_TARGET")
        .env_remove("GIT_STORE_META_LOG");
    command
}

fn records(path: &Path) -> Vec<Record> {
    let file = fs::File::open(path).expect("open snapshot");
    SnapshotReader::new(std::io::BufReader::new(file))
        .expect("header")
        .into_records()
        .expect("records")
}

#[test]
fn help_exits_zero() {
    let temp = tempfile::tempdir().expect("tempdir");
    binary(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--store"))
        .stdout(predicate::str::contains("--install"));
}

#[test]
fn no_action_prints_a_usage_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    binary(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: "))
        .stderr(predicate::str::contains("Usage: git-store-meta"));
}

#[test]
fn outside_a_repository_is_a_setup_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    // Point git at a directory that is not a repository.
    binary(temp.path())
        .env("GIT_DIR", temp.path().join("missing.git"))
        .arg("--store")
        .assert()
        .code(2);
}

#[test]
fn store_update_apply_cycle() {
    let Some(fixture) = GitFixture::new() else {
        return;
    };
    fixture.write_file("keep.txt", b"keep\n");
    fixture.write_file("gone.txt", b"gone\n");
    fixture.commit_all("initial");
    let keep = fixture.join("keep.txt");
    filetime::set_file_mtime(&keep, FileTime::from_unix_time(1_234_567_890, 0)).expect("mtime");

    binary(fixture.path()).args(["-s", "-f", "mtime"]).assert().success();
    let snapshot = fixture.join(".git_store_meta");
    let stored: Vec<String> = records(&snapshot).iter().map(|r| r.path.to_string()).collect();
    assert_eq!(stored, ["gone.txt", "keep.txt"]);

    fixture.git(&["rm", "-q", "gone.txt"]);
    fixture.write_file("new.txt", b"new\n");
    fixture.git(&["add", "new.txt"]);
    binary(fixture.path()).arg("--update").assert().success();
    let updated: Vec<String> = records(&snapshot).iter().map(|r| r.path.to_string()).collect();
    assert_eq!(updated, ["keep.txt", "new.txt"]);

    filetime::set_file_mtime(&keep, FileTime::from_unix_time(1_600_000_000, 0)).expect("mtime");
    binary(fixture.path()).args(["--apply", "--dry-run"]).assert().success();
    assert_eq!(
        FileTime::from_last_modification_time(&fs::metadata(&keep).expect("stat")).unix_seconds(),
        1_600_000_000
    );
    binary(fixture.path()).arg("--apply").assert().success();
    assert_eq!(
        FileTime::from_last_modification_time(&fs::metadata(&keep).expect("stat")).unix_seconds(),
        1_234_567_890
    );
}

#[test]
fn malformed_snapshot_exits_three() {
    let Some(fixture) = GitFixture::new() else {
        return;
    };
    fixture.write_file(
        ".git_store_meta",
        b"# generated by\tgit-store-meta\t1.0.0\n<file>\t<type>\t<mtime>\nx\tq\t\n",
    );
    binary(fixture.path())
        .arg("--apply")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn unsupported_schema_exits_four() {
    let Some(fixture) = GitFixture::new() else {
        return;
    };
    fixture.write_file(
        ".git_store_meta",
        b"# generated by\tgit-store-meta\t1.1.0\n<file>\t<type>\t<mtime>\n",
    );
    binary(fixture.path()).arg("--apply").assert().code(4);
}

#[test]
fn installed_pre_commit_hook_stages_the_snapshot() {
    let Some(fixture) = GitFixture::new() else {
        return;
    };
    fixture.write_file("tracked.txt", b"tracked\n");
    binary(fixture.path()).arg("--install").assert().success();

    let bin_dir = Path::new(PROGRAM).parent().expect("binary directory");
    let mut search_path = vec![bin_dir.to_path_buf()];
    search_path.extend(env::split_paths(&env::var_os("PATH").unwrap_or_else(OsString::new)));
    let path = env::join_paths(search_path).expect("join PATH");

    let add = StdCommand::new("git")
        .args(["add", "tracked.txt"])
        .current_dir(fixture.path())
        .status()
        .expect("git add");
    assert!(add.success());
    let commit = StdCommand::new("git")
        .args(["commit", "-q", "-m", "first"])
        .current_dir(fixture.path())
        .env("PATH", path)
        .env_remove("GIT_STORE_META_TARGET")
        .status()
        .expect("git commit");
    assert!(commit.success());

    let listed = fixture.git(&["ls-files"]);
    let listed = String::from_utf8_lossy(&listed.stdout);
    assert!(listed.lines().any(|line| line == ".git_store_meta"), "{listed}");
    assert!(listed.lines().any(|line| line == "tracked.txt"), "{listed}");
}
