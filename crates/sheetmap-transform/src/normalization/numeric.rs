//! Number coercion for number fields.

use sheetmap_ingest::parse_number;
use sheetmap_model::RawValue;

/// Coerce a raw cell to a number.
///
/// Decoded numbers pass through; text goes through [`parse_number`], which
/// accepts decimal commas and thousands separators. Anything else is `None`.
pub fn transform_to_numeric(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::Text(text) => parse_number(text),
        _ => None,
    }
}
