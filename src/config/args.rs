//! Argument normalization.
//!
//! Turns parsed command line arguments into the highest-precedence layer.
//! Only explicitly supplied options are kept; absent options never shadow
//! config files or defaults.

use super::layer::{Layer, LayerSource};
use super::types::{DEFAULT_CONFIG_FILE, LogFileMode, SettingKey};
use crate::cli::Cli;
use serde_json::{Map, Value};

/// Keyword overrides supplied by an embedding caller.
///
/// They behave like parser defaults: used when the command line does not set
/// the key, ahead of every config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    values: Map<String, Value>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. A `null` value removes the override.
    pub fn with(mut self, key: SettingKey, value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_null() {
            self.values.remove(key.as_str());
        } else {
            self.values.insert(key.as_str().to_string(), value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Flatten one level of nesting, substituting `fill` for each empty group.
///
/// `[[a, b], [], [c]]` becomes `[a, b, fill, c]`.
pub fn flatten_with_fill<T: Clone>(groups: &[Vec<T>], fill: &T) -> Vec<T> {
    let mut flat = Vec::new();
    for group in groups {
        if group.is_empty() {
            flat.push(fill.clone());
        } else {
            flat.extend(group.iter().cloned());
        }
    }
    flat
}

/// Build the command line layer from parsed arguments and keyword overrides.
pub fn command_line_layer(cli: &Cli, overrides: &ConfigOverrides) -> Layer {
    let config_files = cli.config_files.as_ref().map(|groups| {
        let files = flatten_with_fill(groups, &DEFAULT_CONFIG_FILE.to_string());
        Value::from(files)
    });

    let explicit = [
        (SettingKey::ConfigFiles, config_files),
        (SettingKey::Token, cli.token.clone().map(Value::from)),
        (SettingKey::TokenFile, cli.token_file.clone().map(Value::from)),
        (SettingKey::Verbosity, cli.verbosity.clone().map(Value::from)),
        (SettingKey::LogFile, cli.log_file.clone().map(Value::from)),
        (
            SettingKey::LogFileMode,
            cli.log_file_mode
                .map(|mode| Value::from(LogFileMode::from(mode).as_str())),
        ),
        (
            SettingKey::LogFileVerbosity,
            cli.log_file_verbosity.clone().map(Value::from),
        ),
    ];

    let mut values = overrides.values().clone();
    for (key, value) in explicit {
        if let Some(value) = value {
            values.insert(key.as_str().to_string(), value);
        }
    }

    Layer::new(LayerSource::CommandLine, values)
}

/// Layer holding the defaults the argument parser itself declares.
///
/// Every option is declared without a default, so only keyword overrides
/// contribute here.
pub fn parser_defaults_layer(overrides: &ConfigOverrides) -> Layer {
    Layer::new(LayerSource::ParserDefaults, overrides.values().clone())
}
