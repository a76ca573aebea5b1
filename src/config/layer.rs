//! Configuration layers and the precedence-ordered layer stack.
//!
//! A [`Layer`] is an immutable key/value mapping contributed by one source.
//! A [`LayerStack`] holds layers highest-precedence first and resolves each
//! key to the value in the earliest layer that defines it.

use super::types::SettingKey;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// Where a layer's values came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum LayerSource {
    /// Explicit command line arguments and keyword overrides
    CommandLine,
    /// A configuration file, by absolute path
    File(PathBuf),
    /// Built-in defaults
    Defaults,
    /// Defaults declared by the argument parser itself
    ParserDefaults,
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSource::CommandLine => write!(f, "command line"),
            LayerSource::File(path) => write!(f, "{}", path.display()),
            LayerSource::Defaults => write!(f, "defaults"),
            LayerSource::ParserDefaults => write!(f, "parser defaults"),
        }
    }
}

/// One precedence-ranked source of configuration values.
#[derive(Debug, Clone)]
pub struct Layer {
    source: LayerSource,
    values: Map<String, Value>,
}

impl Layer {
    /// Build a layer, dropping `null` values so they never shadow lower layers.
    pub fn new(source: LayerSource, values: Map<String, Value>) -> Self {
        let values = values.into_iter().filter(|(_, v)| !v.is_null()).collect();
        Self { source, values }
    }

    /// Build a layer from key/value pairs.
    pub fn from_pairs(
        source: LayerSource,
        pairs: impl IntoIterator<Item = (SettingKey, Value)>,
    ) -> Self {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.as_str().to_string(), value))
            .collect();
        Self::new(source, values)
    }

    pub fn source(&self) -> &LayerSource {
        &self.source
    }

    /// Value for `key` in this layer only.
    pub fn get(&self, key: SettingKey) -> Option<&Value> {
        self.values.get(key.as_str())
    }

    pub fn contains(&self, key: SettingKey) -> bool {
        self.values.contains_key(key.as_str())
    }

    /// Keys present in this layer that are not settings keys.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|name| SettingKey::from_name(name).is_none())
    }

    /// Config file references listed in this layer, in order.
    ///
    /// Empty strings and `null` entries are skipped. A single string is
    /// treated as a one-element list.
    pub fn config_file_refs(&self) -> Vec<&str> {
        match self.get(SettingKey::ConfigFiles) {
            Some(Value::String(path)) if !path.is_empty() => vec![path.as_str()],
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(Value::as_str)
                .filter(|path| !path.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Ordered sequence of layers, highest precedence first.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer below every layer already on the stack.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// First-match-wins lookup across the stack.
    pub fn resolve(&self, key: SettingKey) -> Option<&Value> {
        self.resolve_with_source(key).map(|(value, _)| value)
    }

    /// Like [`resolve`](Self::resolve), also returning the contributing source.
    pub fn resolve_with_source(&self, key: SettingKey) -> Option<(&Value, &LayerSource)> {
        self.layers
            .iter()
            .find_map(|layer| layer.get(key).map(|value| (value, layer.source())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(source: LayerSource, value: Value) -> Layer {
        match value {
            Value::Object(map) => Layer::new(source, map),
            _ => panic!("test layers must be objects"),
        }
    }

    #[test]
    fn test_null_values_dropped() {
        let cli = layer(
            LayerSource::CommandLine,
            json!({"verbosity": null, "token": "abc"}),
        );
        assert!(!cli.contains(SettingKey::Verbosity));
        assert_eq!(cli.get(SettingKey::Token), Some(&json!("abc")));
    }

    #[test]
    fn test_first_match_wins() {
        let mut stack = LayerStack::new();
        stack.push(layer(LayerSource::CommandLine, json!({"verbosity": "debug"})));
        stack.push(layer(
            LayerSource::File(PathBuf::from("/cfg/a.json")),
            json!({"verbosity": "info", "log_file": "a.log"}),
        ));
        stack.push(layer(
            LayerSource::Defaults,
            json!({"verbosity": "error", "log_file_mode": "append"}),
        ));

        assert_eq!(stack.resolve(SettingKey::Verbosity), Some(&json!("debug")));
        assert_eq!(
            stack.resolve_with_source(SettingKey::LogFile),
            Some((
                &json!("a.log"),
                &LayerSource::File(PathBuf::from("/cfg/a.json"))
            ))
        );
        assert_eq!(
            stack.resolve_with_source(SettingKey::LogFileMode).map(|(_, s)| s),
            Some(&LayerSource::Defaults)
        );
        assert_eq!(stack.resolve(SettingKey::Token), None);
    }

    #[test]
    fn test_null_does_not_shadow_lower_layer() {
        let mut stack = LayerStack::new();
        stack.push(layer(LayerSource::CommandLine, json!({"log_file": null})));
        stack.push(layer(LayerSource::Defaults, json!({"log_file": "bot.log"})));
        assert_eq!(stack.resolve(SettingKey::LogFile), Some(&json!("bot.log")));
    }

    #[test]
    fn test_config_file_refs_skip_empty_entries() {
        let cfg = layer(
            LayerSource::CommandLine,
            json!({"config_files": ["a.json", "", null, "b.json"]}),
        );
        assert_eq!(cfg.config_file_refs(), vec!["a.json", "b.json"]);

        let single = layer(LayerSource::CommandLine, json!({"config_files": "c.json"}));
        assert_eq!(single.config_file_refs(), vec!["c.json"]);
    }

    #[test]
    fn test_unknown_keys_reported() {
        let cfg = layer(
            LayerSource::Defaults,
            json!({"verbosity": "info", "colour": true}),
        );
        assert_eq!(cfg.unknown_keys().collect::<Vec<_>>(), vec!["colour"]);
    }
}
