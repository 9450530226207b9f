// Build Configuration Parser
// Parses build configuration YAML into ordered documents and validates them

use crate::matrix::axis::AxisRegistry;
use crate::parser::error::{ParseError, ParseErrorKind, ParseResult, ValidationError};
use crate::parser::models::{ConfigDocument, ConfigMap, ConfigValue, MatrixRule, MATRIX_KEY};

use std::fs;
use std::path::Path;

/// Keys that only have meaning under `matrix:`
const MATRIX_ONLY_KEYS: [&str; 4] = ["exclude", "include", "allow_failures", "fast_finish"];

/// Build configuration parser
pub struct ConfigParser;

impl ConfigParser {
    /// Parse a document from YAML source
    pub fn parse(content: &str) -> ParseResult<ConfigDocument> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ParseError::from_yaml_error(&e, content))?;

        match ConfigValue::from_yaml(&yaml) {
            ConfigValue::Map(map) => Ok(ConfigDocument::from_map(map)),
            // An empty file is an empty document
            ConfigValue::Null => Ok(ConfigDocument::from_map(ConfigMap::new())),
            other => Err(ParseError::new(
                format!("configuration root must be a mapping, found '{}'", other),
                1,
                1,
            )
            .with_source_context(content, 1)
            .with_suggestion("start the file with a key such as 'language: ruby'")),
        }
    }

    /// Parse a document from a file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<ConfigDocument> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ParseError::new(format!("failed to read file: {}", e), 0, 0)
                .with_kind(ParseErrorKind::IoError)
        })?;

        Self::parse(&content)
    }
}

/// Semantic checks for parsed documents. Findings are advisory: expansion
/// tolerates every document that parses.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(
        document: &ConfigDocument,
        registry: &AxisRegistry,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for key in MATRIX_ONLY_KEYS {
            if document.get(key).is_some() {
                errors.push(
                    ValidationError::new(format!("'{}' has no effect at the top level", key), key)
                        .with_suggestion(format!("move it under '{}:'", MATRIX_KEY)),
                );
            }
        }

        for (key, value) in document.entries().iter() {
            if registry.contains(key) && value.as_sequence().is_some_and(|seq| seq.is_empty()) {
                errors.push(
                    ValidationError::new("empty axis produces no jobs", key)
                        .with_suggestion("remove the key or list at least one value"),
                );
            }
        }

        let matrix = document.matrix();
        Self::validate_rules(document, &matrix.exclude, "matrix.exclude", &mut errors);
        Self::validate_rules(
            document,
            &matrix.allow_failures,
            "matrix.allow_failures",
            &mut errors,
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_rules(
        document: &ConfigDocument,
        rules: &[Option<MatrixRule>],
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        for (i, rule) in rules.iter().enumerate() {
            let path = format!("{}[{}]", path, i);
            let Some(rule) = rule else {
                errors.push(ValidationError::new("entry is not a mapping and is ignored", path));
                continue;
            };

            if rule.constraints.is_empty() {
                errors.push(ValidationError::new("empty rule matches nothing", path));
                continue;
            }

            for key in rule.constraints.keys() {
                if document.get(key).is_none() {
                    errors.push(ValidationError::new(
                        format!("key '{}' is not set in the document, rule can never match", key),
                        path.clone(),
                    ));
                }
            }
        }
    }
}
