// Service Settings
// Axis registry and feature flag state loaded from a YAML settings file

use crate::error::{ServiceError, ServiceResult};
use crate::features::{FeatureTarget, InMemoryFeatureGate, MULTI_OS};
use crate::matrix::axis::{AxisRegistry, GatedAxis, DEFAULT_AXES};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Environment variable naming the settings file
pub const CONFIG_ENV_VAR: &str = "CIBUILD_CONFIG";

/// Top-level service settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceSettings {
    pub matrix: MatrixSection,
    pub features: FeatureSection,
}

/// Matrix expansion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatrixSection {
    /// Expandable keys in nesting order
    pub axes: Vec<String>,
    /// Axis that is only expanded while `os_feature` is enabled
    pub os_axis: String,
    pub os_feature: String,
}

impl Default for MatrixSection {
    fn default() -> Self {
        Self {
            axes: DEFAULT_AXES.iter().map(|axis| axis.to_string()).collect(),
            os_axis: "os".to_string(),
            os_feature: MULTI_OS.to_string(),
        }
    }
}

/// Initial feature flag state
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FeatureSection {
    /// Features switched on for every target
    pub enabled_for_all: Vec<String>,
    /// Feature name -> repository ids
    pub repositories: BTreeMap<String, Vec<u64>>,
    /// Feature name -> owner ids
    pub owners: BTreeMap<String, Vec<u64>>,
}

impl ServiceSettings {
    /// Parse settings from YAML source
    pub fn from_yaml(content: &str) -> ServiceResult<Self> {
        let settings: ServiceSettings =
            serde_yaml::from_str(content).map_err(|e| ServiceError::Settings(e.to_string()))?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load<P: AsRef<Path>>(path: P) -> ServiceResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading service settings");
        Self::from_yaml(&content)
    }

    /// Load from the file named by `CIBUILD_CONFIG`, or defaults when it is unset
    pub fn load_from_env() -> ServiceResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn check(&self) -> ServiceResult<()> {
        if self.matrix.os_axis.is_empty() {
            return Err(ServiceError::Settings("matrix.os_axis must not be empty".into()));
        }
        if let Some(axis) = self.matrix.axes.iter().find(|axis| axis.is_empty()) {
            return Err(ServiceError::Settings(format!(
                "matrix.axes contains an empty name: {:?}",
                axis
            )));
        }
        Ok(())
    }

    pub fn registry(&self) -> AxisRegistry {
        AxisRegistry::new(
            self.matrix.axes.clone(),
            GatedAxis {
                axis: self.matrix.os_axis.clone(),
                feature: self.matrix.os_feature.clone(),
            },
        )
    }

    /// Build a feature gate seeded with the configured flags
    pub fn feature_gate(&self) -> ServiceResult<InMemoryFeatureGate> {
        let gate = InMemoryFeatureGate::new();
        for feature in &self.features.enabled_for_all {
            gate.enable_for_all(feature)?;
        }
        for (feature, ids) in &self.features.repositories {
            for id in ids {
                gate.activate(feature, FeatureTarget::Repository(*id))?;
            }
        }
        for (feature, ids) in &self.features.owners {
            for id in ids {
                gate.activate(feature, FeatureTarget::Owner(*id))?;
            }
        }
        Ok(gate)
    }
}
