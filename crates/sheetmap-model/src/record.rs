//! Canonical records produced by the row normalizer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::FieldType;

/// A typed value held by a canonical record.
///
/// Enum fields carry their category as [`CanonicalValue::Text`]; membership in
/// the allowed list is checked by the validator, not by the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalValue {
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl CanonicalValue {
    /// True if this value has the runtime type a field of `field_type` expects.
    pub fn matches(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (Self::Number(_), FieldType::Number)
                | (Self::Date(_), FieldType::Date)
                | (Self::Text(_), FieldType::String | FieldType::Enum)
        )
    }

    /// Runtime type name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::Text(_) => "string",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for CanonicalValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for CanonicalValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for CanonicalValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// One input row expressed purely in terms of the target schema.
///
/// Every schema field has a slot; `None` is null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRecord {
    values: BTreeMap<String, Option<CanonicalValue>>,
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field, `None` when null or absent.
    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        self.values.get(key).and_then(Option::as_ref)
    }

    pub fn is_null(&self, key: &str) -> bool {
        self.get(key).is_none()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Option<CanonicalValue>) {
        self.values.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&CanonicalValue>)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
