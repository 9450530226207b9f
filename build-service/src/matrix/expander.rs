// Matrix Expansion
// Expands a build configuration document into concrete job configurations

use crate::error::ServiceResult;
use crate::features::{self, FeatureGate, FeatureTarget};
use crate::matrix::axis::{Axis, AxisModel, AxisRegistry};
use crate::matrix::filter::ExclusionFilter;
use crate::parser::models::{ConfigDocument, ConfigMap, ConfigValue};

use serde::Serialize;

/// One fully resolved job of the build matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobConfig {
    /// Key/value assignments in document key order
    #[serde(flatten)]
    pub config: ConfigMap,
    /// Whether a failure of this job leaves the build green
    pub allow_failure: bool,
}

impl JobConfig {
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.config.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.config.contains_key(key)
    }
}

/// Expands documents against an axis registry
#[derive(Debug, Clone, Default)]
pub struct MatrixExpander {
    registry: AxisRegistry,
}

impl MatrixExpander {
    pub fn new(registry: AxisRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AxisRegistry {
        &self.registry
    }

    /// Expand a document for the repository that owns the build.
    ///
    /// Rows are the cross product of the document's axes in registry order,
    /// outer axes varying slowest. While the gating feature is off the gated
    /// axis is removed from every job rather than fixed to one value.
    pub fn expand<G>(
        &self,
        document: &ConfigDocument,
        repository: u64,
        gate: &G,
    ) -> ServiceResult<Vec<JobConfig>>
    where
        G: FeatureGate + ?Sized,
    {
        let gated = self.registry.gated();
        let gate_open = features::is_enabled(
            gate,
            &gated.feature,
            &FeatureTarget::Repository(repository),
        )?;

        let model = AxisModel::new(document, &self.registry);
        let axes: Vec<Axis> = model
            .axes()
            .into_iter()
            .filter(|axis| gate_open || !axis.gated)
            .collect();

        let mut base = document.entries().clone();
        if !gate_open {
            base.remove(&gated.axis);
        }

        let rows: Vec<ConfigMap> = Self::cross_product(&axes)
            .into_iter()
            .map(|row| Self::merge(&base, row.iter().map(|(k, v)| (*k, *v))))
            .collect();
        let candidates = rows.len();

        let matrix = document.matrix();
        let mut rows = ExclusionFilter::new(&matrix.exclude).apply(rows);

        for include in matrix.include.iter().flatten() {
            let mut row = Self::merge(&base, include.constraints.iter());
            if !gate_open {
                row.remove(&gated.axis);
            }
            // Axes the include row leaves unset resolve to their single value or drop out
            for axis in &axes {
                if include.constraints.contains_key(&axis.name) {
                    continue;
                }
                match axis.values.as_slice() {
                    [only] => row.insert(axis.name.clone(), only.clone()),
                    _ => {
                        row.remove(&axis.name);
                    }
                }
            }
            // Include rows duplicating an existing row add nothing
            if !rows.contains(&row) {
                rows.push(row);
            }
        }

        let mut jobs: Vec<JobConfig> = Vec::with_capacity(rows.len());
        for row in rows {
            let allow_failure = matrix
                .allow_failures
                .iter()
                .flatten()
                .any(|rule| rule.matches(&row));
            jobs.push(JobConfig {
                config: row,
                allow_failure,
            });
        }

        tracing::debug!(
            repository,
            axes = axes.len(),
            candidates,
            jobs = jobs.len(),
            gated_axis = %gated.axis,
            gate_open,
            "expanded build matrix"
        );

        Ok(jobs)
    }

    /// All combinations of axis values. The first axis varies slowest.
    fn cross_product(axes: &[Axis]) -> Vec<Vec<(&str, &ConfigValue)>> {
        let mut rows: Vec<Vec<(&str, &ConfigValue)>> = vec![Vec::new()];
        for axis in axes {
            rows = rows
                .iter()
                .flat_map(|row| {
                    axis.values.iter().map(move |value| {
                        let mut next = row.clone();
                        next.push((axis.name.as_str(), value));
                        next
                    })
                })
                .collect();
        }
        rows
    }

    fn merge<'v>(
        base: &ConfigMap,
        assignments: impl Iterator<Item = (&'v str, &'v ConfigValue)>,
    ) -> ConfigMap {
        let mut row = base.clone();
        for (key, value) in assignments {
            row.insert(key, value.clone());
        }
        row
    }
}
