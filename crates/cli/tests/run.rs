use std::fs;
use std::path::Path;

use filetime::FileTime;
use test_support::{GitFixture, SharedBuffer};

struct Outcome {
    status: i32,
    stdout: String,
    stderr: String,
}

fn run(work_dir: &Path, args: &[&str]) -> Outcome {
    let mut stdout = Vec::new();
    let stderr = SharedBuffer::default();
    let argv = std::iter::once("git-store-meta").chain(args.iter().copied());
    let status = cli::run_in(argv, work_dir, &mut stdout, stderr.clone());
    Outcome {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: stderr.contents(),
    }
}

fn committed_fixture() -> Option<GitFixture> {
    let fixture = GitFixture::new()?;
    fixture.write_file("a.txt", b"alpha\n");
    fixture.write_file("sub/b.txt", b"beta\n");
    fixture.commit_all("initial");
    Some(fixture)
}

fn set_mtime(path: &Path, seconds: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(seconds, 0)).expect("set mtime");
}

fn mtime_of(path: &Path) -> i64 {
    FileTime::from_last_modification_time(&fs::symlink_metadata(path).expect("stat")).unix_seconds()
}

#[test]
fn help_goes_to_stdout() {
    let temp = tempfile::tempdir().expect("tempdir");
    let outcome = run(temp.path(), &["--help"]);
    assert_eq!(outcome.status, cli::EXIT_OK);
    assert_eq!(outcome.stdout, cli::HELP_TEXT);
    assert!(outcome.stderr.is_empty());
}

#[test]
fn missing_action_is_a_usage_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let outcome = run(temp.path(), &["-d"]);
    assert_eq!(outcome.status, cli::EXIT_USAGE);
    assert!(outcome.stderr.starts_with("error: no action given"));
    assert!(outcome.stderr.contains("\nUsage: git-store-meta ACTION"), "{}", outcome.stderr);
    assert!(outcome.stdout.is_empty());
}

#[test]
fn unknown_options_and_fields_are_usage_errors() {
    let temp = tempfile::tempdir().expect("tempdir");
    let unknown = run(temp.path(), &["--store", "--bogus"]);
    assert_eq!(unknown.status, cli::EXIT_USAGE);
    assert!(unknown.stderr.starts_with("error: "));

    let field = run(temp.path(), &["--store", "-f", "mtime,colour"]);
    assert_eq!(field.status, cli::EXIT_USAGE);
    assert!(field.stderr.contains("unknown field `colour'"), "{}", field.stderr);
}

#[test]
fn subdirectory_is_rejected() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    let outcome = run(&fixture.join("sub"), &["--store"]);
    assert_eq!(outcome.status, cli::EXIT_SETUP);
    assert!(outcome.stderr.contains("root of the working tree"), "{}", outcome.stderr);
    assert!(!fixture.join(".git_store_meta").exists());
    assert!(!fixture.join("sub/.git_store_meta").exists());
}

#[test]
fn store_then_apply_restores_mtimes() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    let file = fixture.join("a.txt");
    set_mtime(&file, 1_500_000_000);

    let stored = run(fixture.path(), &["--store", "-f", "mtime,mode"]);
    assert_eq!(stored.status, cli::EXIT_OK, "{}", stored.stderr);
    let text = fs::read_to_string(fixture.join(".git_store_meta")).expect("snapshot");
    assert!(text.starts_with("# generated by\tgit-store-meta\t1.0.0\n<file>\t<type>\t<mtime>\t<mode>\n"));
    assert!(text.contains("a.txt\tf\t2017-07-14T02:40:00Z\t"));

    set_mtime(&file, 1_700_000_000);
    let applied = run(fixture.path(), &["--apply", "-v"]);
    assert_eq!(applied.status, cli::EXIT_OK, "{}", applied.stderr);
    assert_eq!(mtime_of(&file), 1_500_000_000);
    assert!(applied.stderr.contains("a.txt"), "{}", applied.stderr);
}

#[test]
fn target_option_selects_the_snapshot_file() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    let outcome = run(fixture.path(), &["-s", "-t", "meta.tsv"]);
    assert_eq!(outcome.status, cli::EXIT_OK, "{}", outcome.stderr);
    assert!(fixture.join("meta.tsv").is_file());
    assert!(!fixture.join(".git_store_meta").exists());
}

#[test]
fn update_without_snapshot_fails() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    let outcome = run(fixture.path(), &["--update"]);
    assert_eq!(outcome.status, cli::EXIT_FAILURE);
    assert!(outcome.stderr.contains("run --store first"), "{}", outcome.stderr);
}

#[test]
fn update_with_other_fields_is_a_usage_error() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    assert_eq!(run(fixture.path(), &["-s", "-f", "mtime"]).status, cli::EXIT_OK);
    let outcome = run(fixture.path(), &["-u", "-f", "mode"]);
    assert_eq!(outcome.status, cli::EXIT_USAGE);
}

#[test]
fn snapshot_defects_map_to_their_statuses() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    let snapshot = fixture.join(".git_store_meta");

    fs::write(
        &snapshot,
        "# generated by\tgit-store-meta\t1.0.0\n<file>\t<type>\t<mtime>\na.txt\tf\n",
    )
    .expect("write malformed");
    let malformed = run(fixture.path(), &["--apply"]);
    assert_eq!(malformed.status, cli::EXIT_MALFORMED);
    assert!(malformed.stderr.contains("line 3"), "{}", malformed.stderr);

    fs::write(
        &snapshot,
        "# generated by\tgit-store-meta\t2.0.0\n<file>\t<type>\t<mtime>\n",
    )
    .expect("write future schema");
    let unsupported = run(fixture.path(), &["--apply"]);
    assert_eq!(unsupported.status, cli::EXIT_UNSUPPORTED);
}

#[test]
fn apply_without_snapshot_succeeds() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    let outcome = run(fixture.path(), &["--apply"]);
    assert_eq!(outcome.status, cli::EXIT_OK);
    assert!(outcome.stderr.is_empty(), "{}", outcome.stderr);
}

#[test]
fn install_writes_executable_hooks() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    let outcome = run(fixture.path(), &["--install", "-d", "-f", "mtime"]);
    assert_eq!(outcome.status, cli::EXIT_OK, "{}", outcome.stderr);

    let hooks = fixture.join(".git/hooks");
    let pre_commit = fs::read_to_string(hooks.join("pre-commit")).expect("pre-commit");
    assert!(pre_commit.contains("git-store-meta --update -f mtime -d"));
    assert!(pre_commit.contains("git add .git_store_meta"));
    for name in ["post-checkout", "post-merge"] {
        let text = fs::read_to_string(hooks.join(name)).expect("hook");
        assert!(text.contains("git-store-meta --apply -f mtime -d"));
    }
}

#[test]
fn install_dry_run_writes_nothing() {
    let Some(fixture) = committed_fixture() else {
        return;
    };
    let outcome = run(fixture.path(), &["-i", "-n"]);
    assert_eq!(outcome.status, cli::EXIT_OK);
    assert!(!fixture.join(".git/hooks/pre-commit").exists());
}
