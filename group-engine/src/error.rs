//! FILENAME: group-engine/src/error.rs

use thiserror::Error;

/// Shape problems surfaced by the strict compile mode. The default
/// `GroupSpec::compile` never raises these; it falls back permissively.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("unknown aggregation operator: {0}")]
    UnknownOperator(String),

    #[error("grouping leaf for '{0}' must be a path string")]
    InvalidGroupingPath(String),

    #[error("calculation key '{0}' has leftover segments after its operator chain")]
    DanglingSegments(String),
}
