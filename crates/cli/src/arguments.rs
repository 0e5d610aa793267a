//! Command-line parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, builder::OsStringValueParser};

/// Operation selected on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Action {
    Help,
    Update,
    Store,
    Apply,
    Install,
    /// No action flag was given.
    None,
}

/// Parsed command produced by [`parse_args`].
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs {
    pub(crate) help: bool,
    pub(crate) store: bool,
    pub(crate) update: bool,
    pub(crate) apply: bool,
    pub(crate) install: bool,
    pub(crate) fields: Option<String>,
    pub(crate) directories: bool,
    pub(crate) dry_run: bool,
    pub(crate) verbose: u8,
    pub(crate) target: Option<PathBuf>,
}

impl ParsedArgs {
    /// Picks one action when several flags are given.
    ///
    /// Help wins, then update, store, apply, and install.
    pub(crate) const fn action(&self) -> Action {
        if self.help {
            Action::Help
        } else if self.update {
            Action::Update
        } else if self.store {
            Action::Store
        } else if self.apply {
            Action::Apply
        } else if self.install {
            Action::Install
        } else {
            Action::None
        }
    }
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new("git-store-meta")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("store")
                .long("store")
                .short('s')
                .help("Store the metadata of all tracked files.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("update")
                .long("update")
                .short('u')
                .help("Update the metadata of staged changes.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("apply")
                .long("apply")
                .short('a')
                .help("Apply the stored metadata to the working tree.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("install")
                .long("install")
                .short('i')
                .help("Install hooks that store and apply metadata automatically.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("field")
                .long("field")
                .short('f')
                .value_name("FIELDS")
                .help("Comma-separated list of fields.")
                .num_args(1)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("directory")
                .long("directory")
                .short('d')
                .help("Include directories.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .help("Show what would be changed without changing anything.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Print every action; repeat for debug output.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .value_name("FILE")
                .help("Snapshot file to use instead of .git_store_meta.")
                .num_args(1)
                .action(ArgAction::Set)
                .value_parser(OsStringValueParser::new()),
        )
}

/// Parses command-line arguments into a [`ParsedArgs`] structure.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from("git-store-meta"));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;
    Ok(ParsedArgs {
        help: matches.get_flag("help"),
        store: matches.get_flag("store"),
        update: matches.get_flag("update"),
        apply: matches.get_flag("apply"),
        install: matches.get_flag("install"),
        fields: matches.remove_one::<String>("field"),
        directories: matches.get_flag("directory"),
        dry_run: matches.get_flag("dry-run"),
        verbose: matches.get_count("verbose"),
        target: matches.remove_one::<OsString>("target").map(PathBuf::from),
    })
}
