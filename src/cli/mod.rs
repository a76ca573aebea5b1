//! CLI definitions for quartermaster
//!
//! Every option is optional so that an absent flag never shadows a value from
//! a config file or the built-in defaults. Normalization into the command line
//! layer happens in [`crate::config::args`].

use crate::config::{DEFAULT_LOG_FILE, DEFAULT_TOKEN_FILE, LogFileMode};
use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, Parser, ValueEnum};
use std::ffi::OsString;

const CONFIG_FILES: &str = "config_files";

/// Log file mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFileModeArg {
    /// Append to an existing log file
    #[value(alias = "a")]
    Append,
    /// Truncate an existing log file
    #[value(alias = "w")]
    Overwrite,
}

impl From<LogFileModeArg> for LogFileMode {
    fn from(mode: LogFileModeArg) -> Self {
        match mode {
            LogFileModeArg::Append => LogFileMode::Append,
            LogFileModeArg::Overwrite => LogFileMode::Overwrite,
        }
    }
}

/// The "Solitude Of War" chat bot
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "quartermaster", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file groups, one per `-f` occurrence. Filled from the matches
    /// by [`Cli::try_parse_args_from`].
    #[arg(skip)]
    pub config_files: Option<Vec<Vec<String>>>,

    /// API token
    #[arg(short, long, conflicts_with = "token_file")]
    pub token: Option<String>,

    /// File which contains the API token (bare flag: api.key)
    #[arg(
        long,
        visible_alias = "tf",
        num_args = 0..=1,
        default_missing_value = DEFAULT_TOKEN_FILE,
        value_name = "FILE"
    )]
    pub token_file: Option<String>,

    /// Console verbosity: critical, error, warning, info, debug (default: error)
    #[arg(short, long, value_name = "LEVEL", help_heading = "Logging")]
    pub verbosity: Option<String>,

    /// File to log bot status (bare flag: server.log)
    #[arg(
        short,
        long,
        num_args = 0..=1,
        default_missing_value = DEFAULT_LOG_FILE,
        value_name = "FILE",
        help_heading = "Logging"
    )]
    pub log_file: Option<String>,

    /// Append to or overwrite the log file (default: append)
    #[arg(long, visible_alias = "lm", value_enum, help_heading = "Logging")]
    pub log_file_mode: Option<LogFileModeArg>,

    /// Log file verbosity (default: debug)
    #[arg(
        long,
        visible_alias = "lv",
        value_name = "LEVEL",
        help_heading = "Logging"
    )]
    pub log_file_verbosity: Option<String>,
}

impl Cli {
    /// Full command definition, including the grouped `--config-files` flag.
    pub fn command_line() -> Command {
        Self::command().arg(
            Arg::new(CONFIG_FILES)
                .short('f')
                .long("config-files")
                .num_args(0..)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String))
                .value_name("FILE")
                .help(
                    "Configuration file(s) containing command line arguments in JSON format, \
                     e.g. {\"token_file\": \"quartermaster.key\", \"verbosity\": \"warning\"}. \
                     May be repeated; a bare flag means config.json",
                )
                .display_order(0),
        )
    }

    /// Parse the process arguments.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse_args_from(std::env::args_os())
    }

    /// Parse `args`, keeping one group of config files per `-f` occurrence.
    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command_line().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut cli = Self::from_arg_matches(matches)?;
        cli.config_files = matches
            .get_occurrences::<String>(CONFIG_FILES)
            .map(|groups| groups.map(|group| group.cloned().collect()).collect());
        Ok(cli)
    }

    /// Rendered `--help` text, printed alongside fatal configuration errors.
    pub fn help_text() -> String {
        Self::command_line().render_help().to_string()
    }
}
