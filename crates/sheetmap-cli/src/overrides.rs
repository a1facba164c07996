//! Mapping overrides read from JSON.
//!
//! ```json
//! {
//!   "fields": { "employee_id": "Anst.nr", "department": null },
//!   "categories": { "gender": { "Annan": "other", "-": "ignore" } }
//! }
//! ```
//!
//! A `null` field entry explicitly unmaps the field.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use sheetmap_core::Session;
use sheetmap_model::CategoryChoice;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingOverrides {
    pub fields: BTreeMap<String, Option<String>>,
    pub categories: BTreeMap<String, BTreeMap<String, String>>,
}

impl MappingOverrides {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read overrides {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("parse overrides {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.categories.is_empty()
    }

    /// Apply field edits first, then category edits. Returns the edit count.
    pub fn apply(&self, session: &mut Session) -> Result<usize> {
        let mut applied = 0usize;
        for (field, column) in &self.fields {
            match column {
                Some(column) => session
                    .set_field_mapping(field, column)
                    .with_context(|| format!("map field '{field}' to '{column}'"))?,
                None => session
                    .clear_field(field)
                    .with_context(|| format!("unmap field '{field}'"))?,
            }
            applied += 1;
        }
        for (field, entries) in &self.categories {
            for (raw, category) in entries {
                session
                    .set_category(field, raw, CategoryChoice::from(category.as_str()))
                    .with_context(|| format!("set category of field '{field}'"))?;
                applied += 1;
            }
        }
        tracing::info!(applied, "Applied mapping overrides");
        Ok(applied)
    }
}
