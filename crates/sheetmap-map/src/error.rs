//! Error types for mapping operations.

use thiserror::Error;

/// Errors from mapping edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Field key not in the target schema.
    #[error("field not found in schema: {0}")]
    FieldNotFound(String),
    /// Column not in the current column profiles.
    #[error("column not found in source: {0}")]
    ColumnNotFound(String),
    /// Category edits apply to enum fields only.
    #[error("field '{0}' is not an enum field")]
    NotAnEnumField(String),
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;
