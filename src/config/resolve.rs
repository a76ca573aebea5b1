//! Flattening the layer stack and post-processing raw values.
//!
//! [`flatten`] collapses the stack into one value per key (first match wins).
//! [`post_process`] turns those raw values into a typed [`Settings`]:
//! level names become [`Verbosity`](super::Verbosity), paths become absolute, and the token is
//! read from its file when not given directly.

use super::files::absolute_path;
use super::layer::{LayerSource, LayerStack};
use super::types::{LogFileMode, SettingKey, Settings, parse_verbosity};
use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One value per key, with the layer it came from.
#[derive(Debug, Clone)]
pub struct Flattened {
    values: BTreeMap<SettingKey, (Value, LayerSource)>,
    /// Every config file loaded, in discovery order.
    pub config_files: Vec<PathBuf>,
}

impl Flattened {
    pub fn get(&self, key: SettingKey) -> Option<&Value> {
        self.values.get(&key).map(|(value, _)| value)
    }

    pub fn source(&self, key: SettingKey) -> Option<&LayerSource> {
        self.values.get(&key).map(|(_, source)| source)
    }

    /// String value of `key`; any other JSON type is rejected.
    fn get_str(&self, key: SettingKey) -> ConfigResult<Option<&str>> {
        match self.values.get(&key) {
            None => Ok(None),
            Some((Value::String(s), _)) => Ok(Some(s.as_str())),
            Some((other, source)) => Err(ConfigError::InvalidSettingValue {
                key: key.as_str(),
                source_name: source.to_string(),
                reason: format!("expected a string, found {other}"),
            }),
        }
    }

    /// Like [`get_str`](Self::get_str), treating the empty string as unset.
    fn get_non_empty(&self, key: SettingKey) -> ConfigResult<Option<&str>> {
        Ok(self.get_str(key)?.filter(|s| !s.is_empty()))
    }

    fn require_str(&self, key: SettingKey) -> ConfigResult<&str> {
        self.get_str(key)?
            .ok_or(ConfigError::MissingSetting { key: key.as_str() })
    }
}

/// Collapse the stack into one value per known key.
///
/// `config_files` is replaced by `discovered`, the list of files actually
/// loaded, so callers can audit exactly what was read.
pub fn flatten(stack: &LayerStack, discovered: Vec<PathBuf>) -> ConfigResult<Flattened> {
    let mut values = BTreeMap::new();
    for key in SettingKey::ALL {
        if key == SettingKey::ConfigFiles {
            continue;
        }
        match stack.resolve_with_source(key) {
            Some((value, source)) => {
                values.insert(key, (value.clone(), source.clone()));
            }
            None if key.is_required() => {
                return Err(ConfigError::MissingSetting { key: key.as_str() });
            }
            None => {}
        }
    }

    Ok(Flattened {
        values,
        config_files: discovered,
    })
}

/// Convert flattened raw values into typed settings.
///
/// Relative paths resolve against `working_dir`.
pub fn post_process(flat: Flattened, working_dir: &Path) -> ConfigResult<Settings> {
    let verbosity = parse_verbosity(
        SettingKey::Verbosity,
        flat.require_str(SettingKey::Verbosity)?,
    )?;
    let log_file_verbosity = parse_verbosity(
        SettingKey::LogFileVerbosity,
        flat.require_str(SettingKey::LogFileVerbosity)?,
    )?;
    let log_file_mode = parse_log_file_mode(&flat)?;

    let log_file = flat
        .get_non_empty(SettingKey::LogFile)?
        .map(|path| absolute_path(working_dir, path));
    let token_file = flat
        .get_non_empty(SettingKey::TokenFile)?
        .map(|path| absolute_path(working_dir, path));

    let (token, token_file) = match flat.get_str(SettingKey::Token)? {
        Some(token) => (token.to_string(), None),
        None => match token_file {
            Some(path) => (read_token(&path)?, Some(path)),
            None => return Err(ConfigError::NoTokenProvided),
        },
    };

    let sources = flat
        .values
        .iter()
        .map(|(key, (_, source))| (*key, source.clone()))
        .collect();

    Ok(Settings {
        token,
        token_file,
        config_files: flat.config_files,
        verbosity,
        log_file,
        log_file_mode,
        log_file_verbosity,
        sources,
    })
}

fn parse_log_file_mode(flat: &Flattened) -> ConfigResult<LogFileMode> {
    let raw = flat.require_str(SettingKey::LogFileMode)?;
    raw.parse().map_err(|reason| ConfigError::InvalidSettingValue {
        key: SettingKey::LogFileMode.as_str(),
        source_name: flat
            .source(SettingKey::LogFileMode)
            .map(ToString::to_string)
            .unwrap_or_default(),
        reason,
    })
}

/// Read and trim the token file. An empty file counts as no token.
fn read_token(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::TokenFileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let token = content.trim();
    if token.is_empty() {
        return Err(ConfigError::NoTokenProvided);
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layer::Layer;
    use crate::config::types::Verbosity;
    use serde_json::json;
    use tempfile::TempDir;

    fn stack_of(layers: Vec<(LayerSource, Value)>) -> LayerStack {
        let mut stack = LayerStack::new();
        for (source, value) in layers {
            let Value::Object(map) = value else {
                panic!("test layers must be objects")
            };
            stack.push(Layer::new(source, map));
        }
        stack
    }

    fn defaults() -> (LayerSource, Value) {
        (
            LayerSource::Defaults,
            json!({
                "verbosity": "error",
                "log_file_mode": "append",
                "log_file_verbosity": "debug",
            }),
        )
    }

    #[test]
    fn test_required_key_missing_is_fatal() {
        let stack = stack_of(vec![(LayerSource::CommandLine, json!({"token": "t"}))]);
        let err = flatten(&stack, Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { key: "verbosity" }));
    }

    #[test]
    fn test_config_files_rewritten_to_discovered() {
        let stack = stack_of(vec![
            (
                LayerSource::CommandLine,
                json!({"config_files": ["a.json", "a.json"], "token": "t"}),
            ),
            defaults(),
        ]);
        let discovered = vec![PathBuf::from("/wd/a.json")];
        let flat = flatten(&stack, discovered.clone()).unwrap();
        assert_eq!(flat.config_files, discovered);
        assert!(flat.get(SettingKey::ConfigFiles).is_none());
    }

    #[test]
    fn test_explicit_token_used_verbatim() {
        let stack = stack_of(vec![
            (
                LayerSource::CommandLine,
                json!({"token": "  spaced token ", "token_file": "ignored.key"}),
            ),
            defaults(),
        ]);
        let settings = post_process(flatten(&stack, vec![]).unwrap(), Path::new("/wd")).unwrap();
        assert_eq!(settings.token, "  spaced token ");
        assert!(settings.token_file.is_none());
    }

    #[test]
    fn test_token_read_from_file_and_trimmed() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("api.key"), "secret-token\n").unwrap();
        let stack = stack_of(vec![
            (LayerSource::CommandLine, json!({"token_file": "api.key"})),
            defaults(),
        ]);

        let settings = post_process(flatten(&stack, vec![]).unwrap(), temp.path()).unwrap();
        assert_eq!(settings.token, "secret-token");
        assert_eq!(settings.token_file, Some(temp.path().join("api.key")));
    }

    #[test]
    fn test_missing_token_file() {
        let temp = TempDir::new().unwrap();
        let stack = stack_of(vec![
            (LayerSource::CommandLine, json!({"token_file": "nope.key"})),
            defaults(),
        ]);
        let err = post_process(flatten(&stack, vec![]).unwrap(), temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TokenFileNotFound { .. }));
    }

    #[test]
    fn test_no_token_provided() {
        let stack = stack_of(vec![defaults()]);
        let err = post_process(flatten(&stack, vec![]).unwrap(), Path::new("/wd")).unwrap_err();
        assert!(matches!(err, ConfigError::NoTokenProvided));
    }

    #[test]
    fn test_levels_case_insensitive_and_paths_absolute() {
        let stack = stack_of(vec![
            (
                LayerSource::CommandLine,
                json!({"token": "t", "verbosity": "DEBUG", "log_file": "logs/bot.log"}),
            ),
            (
                LayerSource::File(PathBuf::from("/wd/a.json")),
                json!({"log_file_verbosity": "Info", "log_file_mode": "w"}),
            ),
            defaults(),
        ]);
        let settings = post_process(flatten(&stack, vec![]).unwrap(), Path::new("/wd")).unwrap();
        assert_eq!(settings.verbosity, Verbosity::Debug);
        assert_eq!(settings.log_file_verbosity, Verbosity::Info);
        assert_eq!(settings.log_file_mode, LogFileMode::Overwrite);
        assert_eq!(settings.log_file, Some(PathBuf::from("/wd/logs/bot.log")));
        assert_eq!(
            settings.source_of(SettingKey::LogFileVerbosity),
            Some(&LayerSource::File(PathBuf::from("/wd/a.json")))
        );
    }

    #[test]
    fn test_invalid_level_from_file() {
        let stack = stack_of(vec![
            (
                LayerSource::File(PathBuf::from("/wd/a.json")),
                json!({"token": "t", "log_file_verbosity": "verbose"}),
            ),
            defaults(),
        ]);
        let err = post_process(flatten(&stack, vec![]).unwrap(), Path::new("/wd")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVerbosityLevel { key: "log_file_verbosity", .. }
        ));
    }

    #[test]
    fn test_non_string_value_rejected() {
        let stack = stack_of(vec![
            (LayerSource::CommandLine, json!({"token": 1234})),
            defaults(),
        ]);
        let err = post_process(flatten(&stack, vec![]).unwrap(), Path::new("/wd")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSettingValue { key: "token", .. }
        ));
    }

    #[test]
    fn test_empty_log_file_means_no_log_file() {
        let stack = stack_of(vec![
            (LayerSource::CommandLine, json!({"token": "t", "log_file": ""})),
            defaults(),
        ]);
        let settings = post_process(flatten(&stack, vec![]).unwrap(), Path::new("/wd")).unwrap();
        assert!(settings.log_file.is_none());
    }
}
