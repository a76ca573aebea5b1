//! Config file loading and recursive expansion.
//!
//! Config files may list further files under `config_files`. Expansion walks
//! the inclusion graph depth-first, left to right, and appends one layer per
//! newly discovered file, so precedence equals discovery order. A file is
//! loaded at most once; later references to it are no-ops, which also makes
//! cycles terminate.
//!
//! Relative paths are resolved against the working directory at resolution
//! time, including paths listed inside a config file.

use super::layer::{Layer, LayerSource, LayerStack};
use super::types::SettingKey;
use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Resolve `path` against `working_dir`, normalizing `.` components.
pub fn absolute_path(working_dir: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };
    joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Parse a single config file into a layer.
///
/// Files ending in `.yaml` or `.yml` are read as YAML; everything else is
/// JSON. The top level must be an object (an empty document counts as one).
pub fn load_config_file(path: &Path) -> ConfigResult<Layer> {
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::ConfigFileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let value = if is_yaml(path) {
        parse_yaml(path, &content)?
    } else {
        parse_json(path, &content)?
    };

    let values = match value {
        Value::Object(map) => map,
        Value::Null => Default::default(),
        other => {
            return Err(ConfigError::ConfigParseError {
                path: path.to_path_buf(),
                line: 1,
                column: 1,
                message: format!("expected an object at the top level, found {}", kind_of(&other)),
            });
        }
    };

    let layer = Layer::new(LayerSource::File(path.to_path_buf()), values);
    validate_config_files(&layer)?;
    for key in layer.unknown_keys() {
        warn!(path = %path.display(), key, "Ignoring unknown configuration key");
    }
    Ok(layer)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

fn parse_json(path: &Path, content: &str) -> ConfigResult<Value> {
    serde_json::from_str(content).map_err(|e| ConfigError::ConfigParseError {
        path: path.to_path_buf(),
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
    })
}

fn parse_yaml(path: &Path, content: &str) -> ConfigResult<Value> {
    serde_yaml::from_str(content).map_err(|e| {
        let (line, column) = e
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((0, 0));
        ConfigError::ConfigParseError {
            path: path.to_path_buf(),
            line,
            column,
            message: e.to_string(),
        }
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `config_files` must be a path or a list of paths (`null` entries allowed).
fn validate_config_files(layer: &Layer) -> ConfigResult<()> {
    let valid = match layer.get(SettingKey::ConfigFiles) {
        None | Some(Value::String(_)) => true,
        Some(Value::Array(entries)) => entries.iter().all(|e| e.is_string() || e.is_null()),
        Some(_) => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidSettingValue {
            key: SettingKey::ConfigFiles.as_str(),
            source_name: layer.source().to_string(),
            reason: "expected a path or a list of paths".to_string(),
        })
    }
}

/// Depth-first expansion state for one resolution pass.
#[derive(Debug)]
pub struct ConfigFileExpander<'a> {
    working_dir: &'a Path,
    /// Loaded files in discovery order
    visited: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl<'a> ConfigFileExpander<'a> {
    pub fn new(working_dir: &'a Path) -> Self {
        Self {
            working_dir,
            visited: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Load every file transitively referenced by `start`, appending one
    /// layer per file to `stack`.
    pub fn expand(&mut self, start: &Layer, stack: &mut LayerStack) -> ConfigResult<()> {
        let refs = owned_refs(start);
        self.expand_refs(refs, stack)
    }

    fn expand_refs(&mut self, refs: Vec<String>, stack: &mut LayerStack) -> ConfigResult<()> {
        for entry in refs {
            let path = absolute_path(self.working_dir, &entry);
            if self.seen.contains(&path) {
                debug!(path = %path.display(), "Config file already loaded, skipping");
                continue;
            }

            let layer = load_config_file(&path)?;
            debug!(path = %path.display(), "Loaded config file");
            self.seen.insert(path.clone());
            self.visited.push(path);

            let nested = owned_refs(&layer);
            stack.push(layer);
            self.expand_refs(nested, stack)?;
        }
        Ok(())
    }

    /// Loaded files in discovery order.
    pub fn visited(&self) -> &[PathBuf] {
        &self.visited
    }

    pub fn into_visited(self) -> Vec<PathBuf> {
        self.visited
    }
}

fn owned_refs(layer: &Layer) -> Vec<String> {
    layer
        .config_file_refs()
        .into_iter()
        .map(str::to_owned)
        .collect()
}
