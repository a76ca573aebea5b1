//! Configuration types and structures.
//!
//! Settings keys, the symbolic values they resolve to, and the final
//! [`Settings`] record handed to the bot client.

use super::layer::LayerSource;
use crate::error::{ConfigError, ConfigResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Placeholder used for a `--config-files` flag given without filenames.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Token file used for a bare `--token-file` flag.
pub const DEFAULT_TOKEN_FILE: &str = "api.key";

/// Log file used for a bare `--log-file` flag.
pub const DEFAULT_LOG_FILE: &str = "server.log";

/// A named configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    Token,
    TokenFile,
    ConfigFiles,
    Verbosity,
    LogFile,
    LogFileMode,
    LogFileVerbosity,
}

impl SettingKey {
    /// Every known key, in declaration order.
    pub const ALL: [SettingKey; 7] = [
        SettingKey::Token,
        SettingKey::TokenFile,
        SettingKey::ConfigFiles,
        SettingKey::Verbosity,
        SettingKey::LogFile,
        SettingKey::LogFileMode,
        SettingKey::LogFileVerbosity,
    ];

    /// Key name as it appears in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Token => "token",
            SettingKey::TokenFile => "token_file",
            SettingKey::ConfigFiles => "config_files",
            SettingKey::Verbosity => "verbosity",
            SettingKey::LogFile => "log_file",
            SettingKey::LogFileMode => "log_file_mode",
            SettingKey::LogFileVerbosity => "log_file_verbosity",
        }
    }

    /// Whether the bot cannot start without a value for this key.
    ///
    /// `config_files` is exempt; token keys are checked during token
    /// resolution instead.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            SettingKey::Verbosity | SettingKey::LogFileMode | SettingKey::LogFileVerbosity
        )
    }

    /// Look up a key by its config-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Verbosity {
    /// Level names in order of decreasing severity.
    pub const NAMES: [&'static str; 5] = ["critical", "error", "warning", "info", "debug"];

    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Debug => "debug",
            Verbosity::Info => "info",
            Verbosity::Warning => "warning",
            Verbosity::Error => "error",
            Verbosity::Critical => "critical",
        }
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Verbosity::Critical),
            "error" => Ok(Verbosity::Error),
            "warning" => Ok(Verbosity::Warning),
            "info" => Ok(Verbosity::Info),
            "debug" => Ok(Verbosity::Debug),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an existing log file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFileMode {
    #[default]
    Append,
    Overwrite,
}

impl LogFileMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFileMode::Append => "append",
            LogFileMode::Overwrite => "overwrite",
        }
    }
}

impl FromStr for LogFileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" | "a" => Ok(LogFileMode::Append),
            "overwrite" | "w" => Ok(LogFileMode::Overwrite),
            _ => Err(format!(
                "unknown log file mode '{}'; expected append or overwrite",
                s
            )),
        }
    }
}

impl fmt::Display for LogFileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a level name for `key`, mapping failure to `InvalidVerbosityLevel`.
pub(crate) fn parse_verbosity(key: SettingKey, value: &str) -> ConfigResult<Verbosity> {
    value
        .parse()
        .map_err(|value| ConfigError::InvalidVerbosityLevel {
            key: key.as_str(),
            value,
        })
}

/// Fully resolved configuration.
///
/// Built once per process by [`super::ConfigLoader`] and consumed by the bot.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// API token for the chat platform.
    #[serde(skip_serializing)]
    pub token: String,
    /// File the token was read from, when it did not come from `--token`.
    pub token_file: Option<PathBuf>,
    /// Every config file loaded, in discovery order.
    pub config_files: Vec<PathBuf>,
    /// Console log level.
    pub verbosity: Verbosity,
    /// Optional log file.
    pub log_file: Option<PathBuf>,
    pub log_file_mode: LogFileMode,
    pub log_file_verbosity: Verbosity,
    /// Which layer supplied each key.
    pub sources: BTreeMap<SettingKey, LayerSource>,
}

impl Settings {
    /// Layer that supplied `key`, if any.
    pub fn source_of(&self, key: SettingKey) -> Option<&LayerSource> {
        self.sources.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_case_insensitive() {
        for name in ["DEBUG", "debug", "Debug"] {
            assert_eq!(name.parse::<Verbosity>(), Ok(Verbosity::Debug));
        }
        assert_eq!("WaRnInG".parse::<Verbosity>(), Ok(Verbosity::Warning));
    }

    #[test]
    fn test_verbosity_total_order() {
        assert!(Verbosity::Critical > Verbosity::Error);
        assert!(Verbosity::Error > Verbosity::Warning);
        assert!(Verbosity::Warning > Verbosity::Info);
        assert!(Verbosity::Info > Verbosity::Debug);
    }

    #[test]
    fn test_unknown_verbosity_rejected() {
        let err = parse_verbosity(SettingKey::Verbosity, "loud").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVerbosityLevel { key: "verbosity", ref value } if value == "loud"
        ));
    }

    #[test]
    fn test_log_file_mode_aliases() {
        assert_eq!("a".parse::<LogFileMode>(), Ok(LogFileMode::Append));
        assert_eq!("W".parse::<LogFileMode>(), Ok(LogFileMode::Overwrite));
        assert!("truncate".parse::<LogFileMode>().is_err());
    }

    #[test]
    fn test_setting_key_names_roundtrip() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_name(key.as_str()), Some(key));
        }
        assert_eq!(SettingKey::from_name("colour"), None);
    }
}
