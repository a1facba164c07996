//! Required fields must not be null.

use sheetmap_model::{CanonicalValue, ErrorKind, FieldDef};

pub fn check(field: &FieldDef, value: Option<&CanonicalValue>) -> Option<(ErrorKind, String)> {
    if field.required && value.is_none() {
        return Some((
            ErrorKind::MissingRequired,
            format!("{} is required", field.label),
        ));
    }
    None
}
