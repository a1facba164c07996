//! Error types for category rule compilation.

use thiserror::Error;

/// Errors raised while compiling a field's category rules.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Pattern is not a valid regular expression.
    #[error("invalid category pattern '{pattern}' for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Rule targets a category the field does not allow.
    #[error("rule '{pattern}' for field '{field}' targets unknown category '{category}'")]
    CategoryNotAllowed {
        field: String,
        pattern: String,
        category: String,
    },

    /// Rules were requested for a field that is not an enum.
    #[error("field '{0}' is not an enum field")]
    NotAnEnumField(String),
}

/// Result type for rule compilation.
pub type Result<T> = std::result::Result<T, RuleError>;
