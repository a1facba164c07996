//! Row normalization: raw rows to canonical records.
//!
//! Every raw row yields exactly one record, in input order, with a slot for
//! every schema field. Cells that fail coercion become null and are counted in
//! [`NormalizeStats`]; they are never reported as errors here.

use serde::Serialize;
use sheetmap_model::{
    CanonicalRecord, CanonicalValue, CategoryChoice, CategoryMapping, CategoryMappings, FieldDef,
    FieldMapping, FieldType, RawTable, RawValue, TargetSchema,
};

use crate::normalization::{transform_to_date, transform_to_numeric};

/// Outcome of coercing one raw cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Value(CanonicalValue),
    /// Missing or whitespace-only cell.
    Empty,
    /// Cell could not be read as the declared type.
    Failed,
    /// Enum value mapped to ignore.
    Ignored,
    /// Enum value with no category decision yet.
    Undecided,
}

/// Counters of one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeStats {
    pub rows: usize,
    pub defaults_applied: usize,
    pub coercion_failures: usize,
    pub ignored: usize,
    pub undecided: usize,
}

/// Coerce one raw cell to the declared type of `field`.
///
/// `categories` is consulted for enum fields only.
pub fn coerce_value(
    field: &FieldDef,
    raw: &RawValue,
    categories: Option<&CategoryMapping>,
) -> Coerced {
    if raw.is_empty() {
        return Coerced::Empty;
    }

    let value = match field.field_type {
        FieldType::Number => transform_to_numeric(raw).map(CanonicalValue::Number),
        FieldType::Date => transform_to_date(raw).map(CanonicalValue::Date),
        FieldType::String => Some(CanonicalValue::Text(raw.to_text().trim().to_string())),
        FieldType::Enum => {
            let text = raw.to_text();
            return match categories.and_then(|m| m.resolve(&text)) {
                Some(CategoryChoice::Category(category)) => {
                    Coerced::Value(CanonicalValue::Text(category.clone()))
                }
                Some(CategoryChoice::Ignore) => Coerced::Ignored,
                None => Coerced::Undecided,
            };
        }
    };

    value.map_or(Coerced::Failed, Coerced::Value)
}

/// Normalize every row of `table`.
///
/// Unmapped fields are null. Empty cells of mapped fields take the declared
/// default when there is one.
pub fn normalize_rows(
    table: &RawTable,
    schema: &TargetSchema,
    fields: &FieldMapping,
    categories: &CategoryMappings,
) -> (Vec<CanonicalRecord>, NormalizeStats) {
    let mut stats = NormalizeStats {
        rows: table.len(),
        ..NormalizeStats::default()
    };
    let columns: Vec<(&FieldDef, Option<&str>)> = schema
        .fields()
        .iter()
        .map(|field| (field, fields.column_for(&field.key)))
        .collect();

    let records = (0..table.len())
        .map(|row| {
            let mut record = CanonicalRecord::new();
            for (field, column) in &columns {
                let value = match column {
                    Some(column) => {
                        let raw = table.value(row, column);
                        let coerced = coerce_value(field, raw, categories.get(&field.key));
                        resolve(field, coerced, row, &mut stats)
                    }
                    None => None,
                };
                record.set(field.key.clone(), value);
            }
            record
        })
        .collect();

    tracing::debug!(
        rows = stats.rows,
        defaults = stats.defaults_applied,
        failures = stats.coercion_failures,
        ignored = stats.ignored,
        undecided = stats.undecided,
        "Normalized rows"
    );
    (records, stats)
}

fn resolve(
    field: &FieldDef,
    coerced: Coerced,
    row: usize,
    stats: &mut NormalizeStats,
) -> Option<CanonicalValue> {
    match coerced {
        Coerced::Value(value) => Some(value),
        Coerced::Empty => {
            if field.default.is_some() {
                stats.defaults_applied += 1;
            }
            field.default.clone()
        }
        Coerced::Failed => {
            stats.coercion_failures += 1;
            tracing::debug!(
                row = row + 1,
                field = %field.key,
                expected = %field.field_type,
                "Coercion failed"
            );
            None
        }
        Coerced::Ignored => {
            stats.ignored += 1;
            None
        }
        Coerced::Undecided => {
            stats.undecided += 1;
            None
        }
    }
}
