// Build configuration parser module

pub mod document;
pub mod error;
pub mod models;

pub use document::{ConfigParser, ConfigValidator};
pub use error::{ParseError, ParseErrorKind, ParseResult, ValidationError};
pub use models::{ConfigDocument, ConfigMap, ConfigValue, MatrixRule, MatrixSettings};
