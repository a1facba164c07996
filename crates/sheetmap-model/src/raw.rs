//! Raw tabular input handed over by the file-decoding collaborator.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw cell: text, or a loosely typed value a spreadsheet decoder has
/// already reduced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

static EMPTY: RawValue = RawValue::Empty;

impl RawValue {
    /// True for missing cells and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual rendering, used wherever a value is inspected as a string.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            RawValue::Empty => Cow::Borrowed(""),
            RawValue::Bool(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
            RawValue::Number(value) => Cow::Owned(format_number(*value)),
            RawValue::Date(date) => Cow::Owned(date.format("%Y-%m-%d").to_string()),
            RawValue::Text(text) => Cow::Borrowed(text),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(value: NaiveDate) -> Self {
        RawValue::Date(value)
    }
}

/// Formats a number without a trailing `.0` for integral values.
fn format_number(value: f64) -> String {
    let s = format!("{value}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// One input row: column name to raw value.
pub type RawRow = BTreeMap<String, RawValue>;

/// Decoded rows plus the header list in original column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from positional text records.
    ///
    /// Short records are padded with empty cells; extra cells are dropped.
    pub fn from_text_rows<S: AsRef<str>>(headers: &[S], records: &[Vec<String>]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(idx, header)| {
                        let value = record
                            .get(idx)
                            .map_or(RawValue::Empty, |cell| RawValue::Text(cell.clone()));
                        (header.clone(), value)
                    })
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row`/`column`; missing cells read as [`RawValue::Empty`].
    pub fn value(&self, row: usize, column: &str) -> &RawValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Append rows of the same source.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = RawRow>) {
        self.rows.extend(rows);
    }
}
