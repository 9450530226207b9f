// Build Configuration Data Models
// Ordered values and documents parsed from build configuration YAML

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// Reserved document key holding the expansion settings
pub const MATRIX_KEY: &str = "matrix";

/// A configuration value. Mappings keep the key order of the source document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Map(ConfigMap),
}

impl ConfigValue {
    /// Convert a serde_yaml value, preserving mapping order
    pub fn from_yaml(yaml: &serde_yaml::Value) -> Self {
        match yaml {
            serde_yaml::Value::Null => ConfigValue::Null,
            serde_yaml::Value::Bool(b) => ConfigValue::Bool(*b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_yaml::Value::String(s) => ConfigValue::String(s.clone()),
            serde_yaml::Value::Sequence(seq) => {
                ConfigValue::Sequence(seq.iter().map(Self::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => ConfigValue::Map(
                map.iter()
                    .filter_map(|(k, v)| yaml_key(k).map(|key| (key, Self::from_yaml(v))))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Mapping keys are strings in practice; scalar keys such as `3.0:` are stringified
fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Integer(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::String(s) => write!(f, "{}", s),
            ConfigValue::Sequence(seq) => {
                let items: Vec<String> = seq.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            ConfigValue::Map(map) => {
                let items: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Integer(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(x) => serializer.serialize_f64(*x),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Map(map) => map.serialize(serializer),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(map: ConfigMap) -> Self {
        ConfigValue::Map(map)
    }
}

impl<V: Into<ConfigValue>> From<Vec<V>> for ConfigValue {
    fn from(items: Vec<V>) -> Self {
        ConfigValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered string-keyed mapping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigMap {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from key/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<ConfigValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for ConfigMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A partial key/value pattern from `matrix.exclude`, `matrix.include` or
/// `matrix.allow_failures`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixRule {
    pub constraints: ConfigMap,
}

impl MatrixRule {
    pub fn new(constraints: ConfigMap) -> Self {
        Self { constraints }
    }

    /// True when every constraint is present with an equal value in `config`.
    /// An empty rule constrains nothing and never matches.
    pub fn matches(&self, config: &ConfigMap) -> bool {
        !self.constraints.is_empty()
            && self
                .constraints
                .iter()
                .all(|(key, value)| config.get(key) == Some(value))
    }
}

/// Expansion settings read from the `matrix` key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixSettings {
    /// Exclusion rules; `None` marks a null or malformed placeholder entry
    pub exclude: Vec<Option<MatrixRule>>,
    /// Extra job rows appended after exclusion
    pub include: Vec<Option<MatrixRule>>,
    /// Rows that are allowed to fail
    pub allow_failures: Vec<Option<MatrixRule>>,
    /// Whether the build finishes as soon as every required job has finished
    pub fast_finish: bool,
}

impl MatrixSettings {
    /// Read settings from the `matrix` value. Anything that is not a mapping yields defaults.
    pub fn from_value(value: Option<&ConfigValue>) -> Self {
        let Some(map) = value.and_then(ConfigValue::as_map) else {
            return Self::default();
        };

        Self {
            exclude: rule_list(map.get("exclude")),
            include: rule_list(map.get("include")),
            allow_failures: rule_list(map.get("allow_failures")),
            fast_finish: map
                .get("fast_finish")
                .and_then(ConfigValue::as_bool)
                .unwrap_or(false),
        }
    }

    /// Number of placeholder entries across all rule lists
    pub fn placeholder_count(&self) -> usize {
        self.exclude
            .iter()
            .chain(&self.include)
            .chain(&self.allow_failures)
            .filter(|rule| rule.is_none())
            .count()
    }
}

fn rule_list(value: Option<&ConfigValue>) -> Vec<Option<MatrixRule>> {
    match value {
        Some(ConfigValue::Sequence(items)) => items
            .iter()
            .map(|item| item.as_map().cloned().map(MatrixRule::new))
            .collect(),
        // A single mapping is accepted as a one-rule list
        Some(ConfigValue::Map(map)) => vec![Some(MatrixRule::new(map.clone()))],
        _ => Vec::new(),
    }
}

/// A parsed build configuration document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigDocument {
    entries: ConfigMap,
    matrix: MatrixSettings,
}

impl ConfigDocument {
    /// Split the reserved `matrix` key from the remaining entries
    pub fn from_map(mut entries: ConfigMap) -> Self {
        let matrix = MatrixSettings::from_value(entries.remove(MATRIX_KEY).as_ref());
        Self { entries, matrix }
    }

    /// Document entries in source order, without the `matrix` key
    pub fn entries(&self) -> &ConfigMap {
        &self.entries
    }

    pub fn matrix(&self) -> &MatrixSettings {
        &self.matrix
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(source: &str) -> ConfigValue {
        ConfigValue::from_yaml(&serde_yaml::from_str(source).unwrap())
    }

    #[test]
    fn test_yaml_value_conversion() {
        assert_eq!(yaml("test"), ConfigValue::String("test".to_string()));
        assert_eq!(yaml("42"), ConfigValue::Integer(42));
        assert_eq!(yaml("1.9"), ConfigValue::Float(1.9));
        assert_eq!(yaml("true"), ConfigValue::Bool(true));
        assert_eq!(yaml("~"), ConfigValue::Null);
        assert_eq!(yaml("2.0.0"), ConfigValue::String("2.0.0".to_string()));
    }

    #[test]
    fn test_mapping_keeps_source_order() {
        let value = yaml("language: ruby\nos: linux\nrvm: 2.0.0\n3.0: float-key\n");
        let map = value.as_map().unwrap();
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["language", "os", "rvm", "3.0"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = ConfigMap::from_pairs([("language", "ruby"), ("rvm", "2.0.0")]);
        map.insert("language", "python".into());
        map.insert("os", "linux".into());

        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["language", "rvm", "os"]);
        assert_eq!(map.get("language"), Some(&ConfigValue::from("python")));
    }

    #[test]
    fn test_rule_matches_partial_constraints() {
        let config = ConfigMap::from_pairs([("rvm", "2.0.0"), ("gemfile", "gemfiles/rails-4")]);

        assert!(MatrixRule::new(ConfigMap::from_pairs([("rvm", "2.0.0")])).matches(&config));
        assert!(!MatrixRule::new(ConfigMap::from_pairs([("rvm", "1.9.3")])).matches(&config));
        assert!(!MatrixRule::new(ConfigMap::from_pairs([("jdk", "openjdk7")])).matches(&config));
        assert!(!MatrixRule::default().matches(&config));
    }

    #[test]
    fn test_matrix_settings_tolerates_nulls() {
        let settings = MatrixSettings::from_value(Some(&yaml(
            "exclude: [~, {rvm: 1.9.3}, plain]\nallow_failures: {rvm: ruby-head}\nfast_finish: true\n",
        )));

        assert_eq!(settings.exclude.len(), 3);
        assert!(settings.exclude[0].is_none());
        assert!(settings.exclude[1].is_some());
        assert!(settings.exclude[2].is_none());
        assert_eq!(settings.allow_failures.len(), 1);
        assert!(settings.include.is_empty());
        assert!(settings.fast_finish);
        assert_eq!(settings.placeholder_count(), 2);
    }

    #[test]
    fn test_matrix_settings_non_mapping() {
        assert_eq!(
            MatrixSettings::from_value(Some(&ConfigValue::from("oops"))),
            MatrixSettings::default()
        );
        assert_eq!(MatrixSettings::from_value(None), MatrixSettings::default());
    }

    #[test]
    fn test_document_splits_matrix_key() {
        let map = yaml("language: ruby\nmatrix:\n  exclude: [~]\n")
            .as_map()
            .cloned()
            .unwrap();
        let document = ConfigDocument::from_map(map);

        assert!(document.get(MATRIX_KEY).is_none());
        assert_eq!(document.entries().len(), 1);
        assert_eq!(document.matrix().exclude, vec![None]);
    }

    #[test]
    fn test_serialize_keeps_order() {
        let map = ConfigMap::from_pairs([("language", "ruby"), ("os", "osx")]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"language":"ruby","os":"osx"}"#
        );
    }
}
