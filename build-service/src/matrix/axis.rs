// Axis Model
// Classifies document keys into fixed values and expandable matrix axes

use crate::features::MULTI_OS;
use crate::parser::models::{ConfigDocument, ConfigValue};

/// Canonical expansion order. The last axis varies fastest.
pub const DEFAULT_AXES: [&str; 19] = [
    "rvm",
    "gemfile",
    "env",
    "jdk",
    "otp_release",
    "php",
    "node_js",
    "perl",
    "python",
    "scala",
    "compiler",
    "go",
    "ghc",
    "rust",
    "dart",
    "julia",
    "xcode_sdk",
    "xcode_scheme",
    "os",
];

/// Axis that only expands while a feature is enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedAxis {
    pub axis: String,
    pub feature: String,
}

impl Default for GatedAxis {
    fn default() -> Self {
        Self {
            axis: "os".to_string(),
            feature: MULTI_OS.to_string(),
        }
    }
}

/// Deployment-defined list of expandable keys, in nesting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisRegistry {
    axes: Vec<String>,
    gated: GatedAxis,
}

impl AxisRegistry {
    /// Create a registry. Repeated names keep their first position; the gated
    /// axis is appended as innermost axis when missing.
    pub fn new(names: Vec<String>, gated: GatedAxis) -> Self {
        let mut axes: Vec<String> = Vec::with_capacity(names.len() + 1);
        for name in names {
            if !axes.contains(&name) {
                axes.push(name);
            }
        }
        if !axes.contains(&gated.axis) {
            axes.push(gated.axis.clone());
        }
        Self { axes, gated }
    }

    pub fn axes(&self) -> &[String] {
        &self.axes
    }

    pub fn gated(&self) -> &GatedAxis {
        &self.gated
    }

    pub fn contains(&self, key: &str) -> bool {
        self.axes.iter().any(|axis| axis == key)
    }

    pub fn is_gated(&self, key: &str) -> bool {
        self.gated.axis == key
    }
}

impl Default for AxisRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_AXES.iter().map(|axis| axis.to_string()).collect(),
            GatedAxis::default(),
        )
    }
}

/// How a document key takes part in expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Copied unchanged into every job
    Fixed,
    /// Always expanded
    Expanded,
    /// Expanded only while the gating feature is enabled
    Gated,
}

/// One configuration dimension and its candidate values
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    pub values: Vec<ConfigValue>,
    pub gated: bool,
}

impl Axis {
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }
}

/// Read-only view of a document's axes
pub struct AxisModel<'a> {
    document: &'a ConfigDocument,
    registry: &'a AxisRegistry,
}

impl<'a> AxisModel<'a> {
    pub fn new(document: &'a ConfigDocument, registry: &'a AxisRegistry) -> Self {
        Self { document, registry }
    }

    pub fn classify(&self, key: &str) -> KeyKind {
        if self.registry.is_gated(key) {
            KeyKind::Gated
        } else if self.registry.contains(key) {
            KeyKind::Expanded
        } else {
            KeyKind::Fixed
        }
    }

    /// Axes present in the document, in registry order. A scalar value of a
    /// registry key is an axis with one candidate.
    pub fn axes(&self) -> Vec<Axis> {
        self.registry
            .axes()
            .iter()
            .filter_map(|name| {
                let value = self.document.get(name)?;
                let values = match value {
                    ConfigValue::Sequence(items) => items.clone(),
                    other => vec![other.clone()],
                };
                Some(Axis {
                    name: name.clone(),
                    values,
                    gated: self.registry.is_gated(name),
                })
            })
            .collect()
    }

    /// Whether `key` is an expandable axis holding a sequence
    pub fn is_array(&self, key: &str) -> bool {
        self.classify(key) != KeyKind::Fixed
            && self
                .document
                .get(key)
                .is_some_and(|value| value.as_sequence().is_some())
    }

    /// Keys copied unchanged into every job
    pub fn fixed_keys(&self) -> Vec<&'a str> {
        self.document
            .entries()
            .keys()
            .filter(|key| self.classify(key) == KeyKind::Fixed)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ConfigParser;

    fn document(source: &str) -> ConfigDocument {
        ConfigParser::parse(source).unwrap()
    }

    #[test]
    fn test_axes_follow_registry_order() {
        let doc = document("language: ruby\nos: [osx, linux]\nrvm: [2.0.0, 1.9.3]\ngemfile: [gemfiles/rails-4]\n");
        let registry = AxisRegistry::default();
        let model = AxisModel::new(&doc, &registry);

        let names: Vec<_> = model.axes().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["rvm", "gemfile", "os"]);
    }

    #[test]
    fn test_classify_keys() {
        let doc = document("language: ruby\nos: linux\nrvm: 2.0.0\n");
        let registry = AxisRegistry::default();
        let model = AxisModel::new(&doc, &registry);

        assert_eq!(model.classify("language"), KeyKind::Fixed);
        assert_eq!(model.classify("rvm"), KeyKind::Expanded);
        assert_eq!(model.classify("os"), KeyKind::Gated);
        assert_eq!(model.fixed_keys(), vec!["language"]);
    }

    #[test]
    fn test_scalar_and_single_element_axes() {
        let doc = document("rvm: 2.0.0\ngemfile: [gemfiles/rails-4]\nlanguage: [ruby, python]\n");
        let registry = AxisRegistry::default();
        let model = AxisModel::new(&doc, &registry);

        let axes = model.axes();
        assert_eq!(axes.len(), 2);
        assert_eq!(axes[0].cardinality(), 1);
        assert_eq!(axes[1].cardinality(), 1);
        assert!(!model.is_array("rvm"));
        assert!(model.is_array("gemfile"));
        // Not a registry key, so never expanded
        assert!(!model.is_array("language"));
    }

    #[test]
    fn test_os_axis_is_gated() {
        let doc = document("os: [osx, linux]\n");
        let registry = AxisRegistry::default();
        let model = AxisModel::new(&doc, &registry);

        let axes = model.axes();
        assert_eq!(axes.len(), 1);
        assert!(axes[0].gated);
        assert!(model.is_array("os"));
    }

    #[test]
    fn test_registry_drops_repeated_names() {
        let registry = AxisRegistry::new(
            vec!["rvm".to_string(), "os".to_string(), "rvm".to_string()],
            GatedAxis::default(),
        );
        assert_eq!(registry.axes(), &["rvm".to_string(), "os".to_string()]);

        let doc = document("rvm: [2.0.0, 1.9.3]\n");
        let axes = AxisModel::new(&doc, &registry).axes();
        assert_eq!(axes.len(), 1);
    }

    #[test]
    fn test_registry_appends_gated_axis() {
        let registry = AxisRegistry::new(vec!["python".to_string()], GatedAxis::default());
        assert_eq!(registry.axes(), &["python".to_string(), "os".to_string()]);
        assert!(registry.contains("os"));
        assert!(!registry.contains("rvm"));
    }
}
