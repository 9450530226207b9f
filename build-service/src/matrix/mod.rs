// Build Matrix Module
// Axis classification, exclusion filtering and matrix expansion

pub mod axis;
pub mod expander;
pub mod filter;

// Re-export key types
pub use axis::{Axis, AxisModel, AxisRegistry, GatedAxis, KeyKind, DEFAULT_AXES};
pub use expander::{JobConfig, MatrixExpander};
pub use filter::ExclusionFilter;
