//! Command-line interface for fprettier-lex.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to lex
    pub inputs: Vec<PathBuf>,

    /// Recursive directory processing
    pub recursive: bool,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Custom Fortran file extensions (in addition to defaults)
    pub fortran_extensions: Vec<String>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Spaces per tab character
    pub tab_width: Option<usize>,

    /// Treat truncated continuations and round-trip mismatches as errors
    pub strict: bool,

    /// Only verify that the physical lines reproduce the input
    pub check: bool,

    /// Also print comment text of each logical line
    pub comments: bool,

    /// Silent mode (no summary)
    pub silent: bool,

    /// Enable debug output
    pub debug: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("fprettier-lex")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Fred Jones")
        .about("Split Fortran source into logical lines (continuations, semicolons, comments)")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to lex ('-' or none reads stdin)")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively lex directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("fortran")
                .short('f')
                .long("fortran")
                .help("Additional Fortran file extension (can be repeated, e.g., -f f03 -f F03)")
                .value_name("EXT")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file [default: ./fprettier-lex.toml if present]")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("tab-width")
                .short('t')
                .long("tab-width")
                .help("Spaces substituted for each tab [default: 8]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail on continuations left open at end of file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Only check that the lexed lines reproduce the input")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("comments")
                .long("comments")
                .help("Also print the comments of each logical line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows config, files, line counts)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (no summary)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        recursive: matches.get_flag("recursive"),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        fortran_extensions: matches
            .get_many::<String>("fortran")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        tab_width: matches.get_one::<usize>("tab-width").copied(),
        strict: matches.get_flag("strict"),
        check: matches.get_flag("check"),
        comments: matches.get_flag("comments"),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
    }
}
