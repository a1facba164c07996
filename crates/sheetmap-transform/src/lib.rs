//! Normalization of raw spreadsheet rows into canonical records.
//!
//! # Overview
//!
//! - **Category classification**: ordered `{pattern, category}` rules turn
//!   free-text categorical values into allowed categories
//! - **Value coercion**: numbers with locale separators, dates in several
//!   layouts, trimmed text
//! - **Row normalization**: applies the field and category mappings to every
//!   raw row, in input order
//!
//! All functions are pure; identical inputs always yield identical records.

mod error;

pub mod normalization;
pub mod rows;

// Error type
pub use error::{Result, RuleError};

// Category classification
pub use normalization::{
    CategoryRule, CategoryRules, CategorySuggestion, compile_schema_rules, fallback_category,
    suggest_categories,
};

// Row normalization
pub use rows::{Coerced, NormalizeStats, coerce_value, normalize_rows};
