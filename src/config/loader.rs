//! Configuration loader with layer-based resolution.
//!
//! Runs one resolution pass: normalize arguments, expand config files,
//! append defaults, flatten, post-process.

use super::args::{ConfigOverrides, command_line_layer, parser_defaults_layer};
use super::files::ConfigFileExpander;
use super::layer::{Layer, LayerSource, LayerStack};
use super::resolve::{flatten, post_process};
use super::types::{LogFileMode, SettingKey, Settings, Verbosity};
use crate::cli::Cli;
use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Built-in defaults, the lowest layer that guarantees coverage of every
/// required key.
pub fn defaults_layer() -> Layer {
    Layer::from_pairs(
        LayerSource::Defaults,
        [
            (
                SettingKey::Verbosity,
                Value::from(Verbosity::Error.as_str()),
            ),
            (
                SettingKey::LogFileMode,
                Value::from(LogFileMode::Append.as_str()),
            ),
            (
                SettingKey::LogFileVerbosity,
                Value::from(Verbosity::Debug.as_str()),
            ),
        ],
    )
}

/// Layer stack for one resolution pass, before flattening.
#[derive(Debug, Clone)]
pub struct LoadedStack {
    pub stack: LayerStack,
    /// Config files loaded, in discovery order
    pub config_files: Vec<PathBuf>,
}

/// Resolves command line arguments, config files and defaults into
/// [`Settings`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Directory relative paths are resolved against
    working_dir: PathBuf,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    /// Loader resolving relative paths against `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            overrides: ConfigOverrides::default(),
        }
    }

    /// Loader for the process's current working directory.
    pub fn from_current_dir() -> ConfigResult<Self> {
        let working_dir = std::env::current_dir().map_err(|source| ConfigError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(Self::new(working_dir))
    }

    /// Set keyword overrides.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Build the full layer stack: command line, config files in discovery
    /// order, built-in defaults, parser defaults.
    pub fn load_stack(&self, cli: &Cli) -> ConfigResult<LoadedStack> {
        let cli_layer = command_line_layer(cli, &self.overrides);

        let mut stack = LayerStack::new();
        let mut expander = ConfigFileExpander::new(&self.working_dir);
        stack.push(cli_layer.clone());
        expander.expand(&cli_layer, &mut stack)?;
        let config_files = expander.into_visited();

        stack.push(defaults_layer());
        stack.push(parser_defaults_layer(&self.overrides));

        debug!(
            layers = stack.len(),
            config_files = config_files.len(),
            "Built configuration layer stack"
        );

        Ok(LoadedStack {
            stack,
            config_files,
        })
    }

    /// Resolve `cli` into final settings.
    pub fn resolve(&self, cli: &Cli) -> ConfigResult<Settings> {
        let LoadedStack {
            stack,
            config_files,
        } = self.load_stack(cli)?;
        let flat = flatten(&stack, config_files)?;
        post_process(flat, &self.working_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_cover_required_keys() {
        let defaults = defaults_layer();
        for key in SettingKey::ALL.into_iter().filter(|k| k.is_required()) {
            assert!(defaults.contains(key), "defaults missing {key}");
        }
    }

    #[test]
    fn test_stack_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.json"), r#"{"verbosity": "info"}"#).unwrap();

        let cli = Cli {
            config_files: Some(vec![vec!["a.json".to_string()]]),
            ..Default::default()
        };
        let loaded = ConfigLoader::new(temp.path()).load_stack(&cli).unwrap();
        let sources: Vec<&LayerSource> = loaded.stack.layers().iter().map(Layer::source).collect();

        assert_eq!(
            sources,
            vec![
                &LayerSource::CommandLine,
                &LayerSource::File(temp.path().join("a.json")),
                &LayerSource::Defaults,
                &LayerSource::ParserDefaults,
            ]
        );
        assert_eq!(loaded.config_files, vec![temp.path().join("a.json")]);
    }

    #[test]
    fn test_overrides_rank_above_config_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("a.json"),
            r#"{"verbosity": "info", "token": "file-token"}"#,
        )
        .unwrap();

        let cli = Cli {
            config_files: Some(vec![vec!["a.json".to_string()]]),
            ..Default::default()
        };
        let loader = ConfigLoader::new(temp.path())
            .with_overrides(ConfigOverrides::new().with(SettingKey::Verbosity, "critical"));
        let settings = loader.resolve(&cli).unwrap();

        assert_eq!(settings.verbosity, Verbosity::Critical);
        assert_eq!(settings.token, "file-token");
    }
}
