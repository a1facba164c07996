//! Validation of canonical records against the target schema.
//!
//! Every record is checked against every schema field. Per field the first
//! failing check wins, in this order: required, type, category. Nothing
//! short-circuits across fields or rows.

mod checks;

use sheetmap_model::{CanonicalRecord, TargetSchema, ValidationError, ValidationReport};

/// Validate all records. Row numbers in the report are 1-based.
pub fn validate(records: &[CanonicalRecord], schema: &TargetSchema) -> ValidationReport {
    let mut errors = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let row_index = idx + 1;
        for field in schema.fields() {
            let value = record.get(&field.key);
            let kind_and_message = checks::required::check(field, value)
                .or_else(|| checks::types::check(field, value))
                .or_else(|| checks::categories::check(field, value));

            if let Some((kind, message)) = kind_and_message {
                errors.push(ValidationError {
                    row_index,
                    field_key: field.key.clone(),
                    kind,
                    message,
                });
            }
        }
    }

    let report = ValidationReport::from_errors(errors);
    tracing::info!(
        records = records.len(),
        errors = report.error_count(),
        valid = report.is_valid,
        "Validated records"
    );
    report
}
