//! Present values must have the declared runtime type.

use sheetmap_model::{CanonicalValue, ErrorKind, FieldDef};

pub fn check(field: &FieldDef, value: Option<&CanonicalValue>) -> Option<(ErrorKind, String)> {
    let value = value?;
    if value.matches(field.field_type) {
        return None;
    }
    Some((
        ErrorKind::TypeMismatch,
        format!(
            "{}: expected {}, got {} '{value}'",
            field.label,
            field.field_type,
            value.type_name()
        ),
    ))
}
