//! Error types for schema and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::FieldType;

/// Errors raised while building or loading a [`TargetSchema`](crate::TargetSchema).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema file could not be read.
    #[error("failed to read schema file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema JSON is malformed.
    #[error("failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),

    /// Schema declares no fields.
    #[error("schema '{name}' has no fields")]
    Empty { name: String },

    /// Two fields share the same key.
    #[error("duplicate field key '{key}'")]
    DuplicateKey { key: String },

    /// Enum field without any allowed category.
    #[error("enum field '{key}' declares no allowed categories")]
    EnumWithoutCategories { key: String },

    /// Allowed categories, neutral category or rules on a non-enum field.
    #[error("field '{key}' is not an enum but declares category settings")]
    CategoriesOnNonEnum { key: String },

    /// A category collides with the reserved "ignore" choice.
    #[error("field '{key}' uses the reserved category name 'ignore'")]
    ReservedCategory { key: String },

    /// Neutral category is not part of the allowed list.
    #[error("neutral category '{category}' of field '{key}' is not an allowed category")]
    NeutralNotAllowed { key: String, category: String },

    /// Enum default is not part of the allowed list.
    #[error("default '{value}' of field '{key}' is not an allowed category")]
    DefaultNotAllowed { key: String, value: String },

    /// Default cannot be read as the field's declared type.
    #[error("default '{value}' of field '{key}' is not a valid {field_type} value")]
    DefaultTypeMismatch {
        key: String,
        field_type: FieldType,
        value: String,
    },

    /// A category rule targets a category outside the allowed list.
    #[error("rule '{pattern}' of field '{key}' targets unknown category '{category}'")]
    RuleCategoryNotAllowed {
        key: String,
        pattern: String,
        category: String,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchemaError::NeutralNotAllowed {
            key: "gender".to_string(),
            category: "x".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "neutral category 'x' of field 'gender' is not an allowed category"
        );
    }
}
