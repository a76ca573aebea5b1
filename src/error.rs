//! Errors raised while resolving configuration.
//!
//! Every variant is terminal for the resolution pass: there is no partial
//! configuration. The binary maps each variant to a process exit code via
//! [`ConfigError::exit_code`].

use crate::config::Verbosity;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for a declared file that does not exist (`ENOENT`).
pub const EXIT_NOT_FOUND: i32 = 2;

/// Exit code when no credential can be resolved (`EACCES`).
pub const EXIT_ACCESS: i32 = 13;

/// Exit code for any other usage or configuration error (`EX_USAGE`).
pub const EXIT_USAGE: i32 = 64;

/// Configuration resolution error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A referenced configuration file does not exist.
    #[error("configuration file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    /// A configuration file exists but could not be parsed.
    #[error("failed to parse {} at line {line}, column {column}: {message}", path.display())]
    ConfigParseError {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// A verbosity setting names no known level.
    #[error(
        "invalid verbosity level '{value}' for {key}; expected one of: {}",
        Verbosity::NAMES.join(", ")
    )]
    InvalidVerbosityLevel { key: &'static str, value: String },

    /// A setting has the wrong type or an unsupported value.
    #[error("invalid value for {key} from {source_name}: {reason}")]
    InvalidSettingValue {
        key: &'static str,
        source_name: String,
        reason: String,
    },

    /// A required setting has no value in any layer.
    #[error("no value for required setting {key}")]
    MissingSetting { key: &'static str },

    /// The token file could not be found.
    #[error("{} cannot be found; please indicate a token", path.display())]
    TokenFileNotFound { path: PathBuf },

    /// Neither a token nor a token file was provided.
    #[error("no token or token file provided; please indicate a token")]
    NoTokenProvided,

    /// Any other I/O failure while reading a file.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::ConfigFileNotFound { .. } | ConfigError::TokenFileNotFound { .. } => {
                EXIT_NOT_FOUND
            }
            ConfigError::NoTokenProvided => EXIT_ACCESS,
            ConfigError::ConfigParseError { .. }
            | ConfigError::InvalidVerbosityLevel { .. }
            | ConfigError::InvalidSettingValue { .. }
            | ConfigError::MissingSetting { .. }
            | ConfigError::Io { .. } => EXIT_USAGE,
        }
    }
}

/// Result type for configuration resolution.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_distinguish_failure_kinds() {
        let missing = ConfigError::ConfigFileNotFound {
            path: PathBuf::from("/tmp/missing.json"),
        };
        let token_missing = ConfigError::TokenFileNotFound {
            path: PathBuf::from("/tmp/api.key"),
        };
        assert_eq!(missing.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(token_missing.exit_code(), EXIT_NOT_FOUND);
        assert_eq!(ConfigError::NoTokenProvided.exit_code(), EXIT_ACCESS);
        assert_eq!(
            ConfigError::MissingSetting { key: "verbosity" }.exit_code(),
            EXIT_USAGE
        );
    }

    #[test]
    fn test_parse_error_message_names_location() {
        let err = ConfigError::ConfigParseError {
            path: PathBuf::from("/etc/qm/config.json"),
            line: 3,
            column: 7,
            message: "expected `:`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/qm/config.json"));
        assert!(msg.contains("line 3, column 7"));
    }

    #[test]
    fn test_invalid_verbosity_message_lists_levels() {
        let err = ConfigError::InvalidVerbosityLevel {
            key: "log_file_verbosity",
            value: "chatty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid verbosity level 'chatty' for log_file_verbosity; \
             expected one of: critical, error, warning, info, debug"
        );
    }
}
