// Build Service Library
// Build matrix expansion, feature gating and user sync for the CI platform

pub mod error;
pub mod features;
pub mod matrix;
pub mod parser;
pub mod settings;
pub mod sync;

// Re-export commonly used types
pub use error::{ServiceError, ServiceResult};

// Re-export parser types
pub use parser::{
    ConfigDocument, ConfigMap, ConfigParser, ConfigValidator, ConfigValue, MatrixRule,
    MatrixSettings, ParseError, ParseErrorKind, ParseResult, ValidationError,
};

// Re-export feature gate types
pub use features::{
    is_enabled, FeatureGate, FeatureTarget, InMemoryFeatureGate, EDUCATION_DATA_SYNC, MULTI_OS,
};

// Re-export matrix types
pub use matrix::{Axis, AxisModel, AxisRegistry, ExclusionFilter, JobConfig, MatrixExpander};

// Re-export settings
pub use settings::ServiceSettings;

// Re-export user sync types
pub use sync::{
    AccountEmail, GithubClient, InMemoryUserStore, LocalUser, ProfileUpdate, RemoteProfile,
    StaticGithubClient, UserInfo, UserStore,
};
