//! Validation report types.
//!
//! The report is the only artifact a caller must act on: committing an import
//! is gated on [`ValidationReport::is_valid`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of schema violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Required field holds null.
    MissingRequired,
    /// Value's runtime type disagrees with the declared type.
    TypeMismatch,
    /// Enum value outside the allowed categories.
    InvalidEnumValue,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequired => "missing-required",
            Self::TypeMismatch => "type-mismatch",
            Self::InvalidEnumValue => "invalid-enum-value",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingRequired => "Missing required value",
            Self::TypeMismatch => "Type mismatch",
            Self::InvalidEnumValue => "Invalid category",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violation at one row and field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// 1-based row number for display.
    pub row_index: usize,
    pub field_key: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Every violation found across all canonical records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn count_by_kind(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for error in &self.errors {
            *counts.entry(error.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Errors for a 1-based row number.
    pub fn errors_for_row(&self, row_index: usize) -> impl Iterator<Item = &ValidationError> {
        self.errors
            .iter()
            .filter(move |e| e.row_index == row_index)
    }

    pub fn errors_for_field<'a>(
        &'a self,
        field_key: &'a str,
    ) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field_key == field_key)
    }
}
