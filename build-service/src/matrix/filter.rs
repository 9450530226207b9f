// Exclusion Filter
// Drops candidate rows matching `matrix.exclude`, skipping placeholder entries

use crate::parser::models::{ConfigMap, MatrixRule};

/// Matches rows against a list of matrix rules
pub struct ExclusionFilter<'a> {
    rules: &'a [Option<MatrixRule>],
}

impl<'a> ExclusionFilter<'a> {
    pub fn new(rules: &'a [Option<MatrixRule>]) -> Self {
        let placeholders = rules.iter().filter(|rule| rule.is_none()).count();
        if placeholders > 0 {
            tracing::warn!(placeholders, "skipping placeholder matrix rules");
        }
        Self { rules }
    }

    /// True when at least one non-placeholder rule matches every key it names
    pub fn excludes(&self, config: &ConfigMap) -> bool {
        self.rules.iter().flatten().any(|rule| rule.matches(config))
    }

    /// Keep the rows no rule excludes, preserving order
    pub fn apply(&self, rows: Vec<ConfigMap>) -> Vec<ConfigMap> {
        let before = rows.len();
        let kept: Vec<ConfigMap> = rows.into_iter().filter(|row| !self.excludes(row)).collect();
        tracing::debug!(excluded = before - kept.len(), "applied matrix exclusions");
        kept
    }
}
