//! Enum values must be one of the allowed categories.

use sheetmap_model::{CanonicalValue, ErrorKind, FieldDef};

pub fn check(field: &FieldDef, value: Option<&CanonicalValue>) -> Option<(ErrorKind, String)> {
    if !field.is_enum() {
        return None;
    }
    let category = value?.as_text()?;
    if field.allows(category) {
        return None;
    }
    Some((
        ErrorKind::InvalidEnumValue,
        format!(
            "'{category}' is not an allowed {} (expected one of: {})",
            field.label,
            field.allowed.join(", ")
        ),
    ))
}
