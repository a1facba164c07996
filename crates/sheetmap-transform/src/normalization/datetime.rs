//! Date coercion for date fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sheetmap_ingest::date_format_for;
use sheetmap_model::RawValue;

/// Timestamp layouts tried before the day/month/year patterns.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse date text.
///
/// Tries RFC 3339 and ISO timestamps first, then the day/month/year layouts
/// shared with the profiler. Impossible dates such as `31/02/2024` are `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    let format = date_format_for(trimmed)?;
    NaiveDate::parse_from_str(trimmed, format).ok()
}

/// Coerce a raw cell to a date.
pub fn transform_to_date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Date(date) => Some(*date),
        RawValue::Text(text) => parse_date(text),
        _ => None,
    }
}
