//! Column profiles produced by the profiler.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::FieldType;

/// Type inferred for a raw column from its sample window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        }
    }

    /// True if a field of `field_type` declares this same type.
    ///
    /// Enum fields never match: categorical columns are recognised by their
    /// distinct-value count instead.
    pub fn matches(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (ColumnType::String, FieldType::String)
                | (ColumnType::Number, FieldType::Number)
                | (ColumnType::Date, FieldType::Date)
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of one raw column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    /// Raw column name as found in the header.
    pub name: String,
    /// Position in the header list; the matcher's tie-break key.
    pub index: usize,
    pub inferred_type: ColumnType,
    /// First non-empty values in row order, bounded.
    pub samples: Vec<String>,
    /// Distinct trimmed non-empty values in first-seen order, bounded.
    pub distinct: Vec<String>,
    /// True when more distinct values exist than were kept.
    pub distinct_truncated: bool,
    pub row_count: usize,
    pub non_empty_count: usize,
}

impl ColumnProfile {
    pub fn distinct_count(&self) -> usize {
        self.distinct.len()
    }

    /// Ratio of empty cells (0.0 to 1.0).
    pub fn null_ratio(&self) -> f64 {
        if self.row_count == 0 {
            return 1.0;
        }
        (self.row_count - self.non_empty_count) as f64 / self.row_count as f64
    }

    pub fn is_empty(&self) -> bool {
        self.non_empty_count == 0
    }
}
