//! Value-level normalization functions.
//!
//! - **category**: rule-based classification of categorical text
//! - **numeric**: number coercion with locale separators
//! - **datetime**: date coercion from decoded dates and text layouts

pub mod category;
pub mod datetime;
pub mod numeric;

pub use category::{
    CategoryRule, CategoryRules, CategorySuggestion, compile_schema_rules, fallback_category,
    suggest_categories,
};
pub use datetime::{parse_date, transform_to_date};
pub use numeric::transform_to_numeric;
