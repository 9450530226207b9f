// Feature Gate
// Two-tier capability flags: a global switch per feature, then per-target activation

use crate::error::{ServiceError, ServiceResult};

use std::collections::HashSet;
use std::fmt;
use std::sync::RwLock;

/// Gates the `os` axis of the build matrix
pub const MULTI_OS: &str = "multi_os";

/// Gates syncing of education status during user sync
pub const EDUCATION_DATA_SYNC: &str = "education_data_sync";

/// Something a feature can be activated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureTarget {
    Repository(u64),
    Owner(u64),
}

impl fmt::Display for FeatureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureTarget::Repository(id) => write!(f, "repository:{}", id),
            FeatureTarget::Owner(id) => write!(f, "owner:{}", id),
        }
    }
}

/// Backend answering feature flag queries
pub trait FeatureGate: Send + Sync {
    /// Whether the feature is switched on for every target
    fn enabled_for_all(&self, feature: &str) -> ServiceResult<bool>;

    /// Whether the feature is activated for one target. Unset means false.
    fn active(&self, feature: &str, target: &FeatureTarget) -> ServiceResult<bool>;
}

/// Resolve a feature for a target. A global "on" wins and skips the scoped lookup.
pub fn is_enabled<G>(gate: &G, feature: &str, target: &FeatureTarget) -> ServiceResult<bool>
where
    G: FeatureGate + ?Sized,
{
    if gate.enabled_for_all(feature)? {
        tracing::trace!(feature, "feature enabled for all targets");
        return Ok(true);
    }
    gate.active(feature, target)
}

/// Process-local feature flag state
#[derive(Debug, Default)]
pub struct InMemoryFeatureGate {
    global: RwLock<HashSet<String>>,
    scoped: RwLock<HashSet<(String, FeatureTarget)>>,
}

impl InMemoryFeatureGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_for_all(&self, feature: &str) -> ServiceResult<()> {
        self.global
            .write()
            .map_err(|_| poisoned(feature))?
            .insert(feature.to_string());
        Ok(())
    }

    pub fn disable_for_all(&self, feature: &str) -> ServiceResult<()> {
        self.global
            .write()
            .map_err(|_| poisoned(feature))?
            .remove(feature);
        Ok(())
    }

    pub fn activate(&self, feature: &str, target: FeatureTarget) -> ServiceResult<()> {
        self.scoped
            .write()
            .map_err(|_| poisoned(feature))?
            .insert((feature.to_string(), target));
        Ok(())
    }

    pub fn deactivate(&self, feature: &str, target: FeatureTarget) -> ServiceResult<()> {
        self.scoped
            .write()
            .map_err(|_| poisoned(feature))?
            .remove(&(feature.to_string(), target));
        Ok(())
    }
}

impl FeatureGate for InMemoryFeatureGate {
    fn enabled_for_all(&self, feature: &str) -> ServiceResult<bool> {
        Ok(self
            .global
            .read()
            .map_err(|_| poisoned(feature))?
            .contains(feature))
    }

    fn active(&self, feature: &str, target: &FeatureTarget) -> ServiceResult<bool> {
        Ok(self
            .scoped
            .read()
            .map_err(|_| poisoned(feature))?
            .contains(&(feature.to_string(), *target)))
    }
}

fn poisoned(feature: &str) -> ServiceError {
    ServiceError::feature_lookup(feature, "feature state lock poisoned")
}
