// Service Error Types
// Crate-wide error enum shared by matrix expansion, feature lookups and user sync

use crate::parser::ParseError;

use std::io;
use thiserror::Error;

/// Errors produced by the build service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A feature gate backend could not answer a lookup
    #[error("feature lookup failed for '{feature}': {message}")]
    FeatureLookup { feature: String, message: String },

    /// A local user could not be reconciled with its remote profile
    #[error("Updating {login} failed: {reason}")]
    UpdateFailed { login: String, reason: String },

    /// The user store rejected an operation
    #[error("user store error: {0}")]
    Store(String),

    /// A configuration document could not be parsed
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The service settings file is invalid
    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ServiceError {
    pub fn feature_lookup(feature: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::FeatureLookup {
            feature: feature.into(),
            message: message.into(),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_failed_message() {
        let err = ServiceError::UpdateFailed {
            login: "rkh".to_string(),
            reason: "github id mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Updating rkh failed: github id mismatch");
    }

    #[test]
    fn test_feature_lookup_message() {
        let err = ServiceError::feature_lookup("multi_os", "backend unavailable");
        assert!(err.to_string().contains("'multi_os'"));
        assert!(err.to_string().contains("backend unavailable"));
    }
}
