//! Pure recomputation of records and report from mappings.
//!
//! [`derive`] is the only path from a field mapping to canonical records.
//! The latest result is memoized by a SHA-256 digest of its inputs; a
//! recompute with unchanged inputs reuses it.

use serde::Serialize;
use sha2::{Digest, Sha256};
use sheetmap_model::{
    CanonicalRecord, CategoryMappings, FieldMapping, RawTable, TargetSchema, ValidationReport,
};
use sheetmap_transform::{NormalizeStats, normalize_rows};

/// Everything computed from one set of mappings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derived {
    pub records: Vec<CanonicalRecord>,
    pub stats: NormalizeStats,
    pub report: ValidationReport,
}

/// Normalize and validate.
pub fn derive(
    table: &RawTable,
    schema: &TargetSchema,
    fields: &FieldMapping,
    categories: &CategoryMappings,
) -> Derived {
    let (records, stats) = normalize_rows(table, schema, fields, categories);
    let report = sheetmap_validate::validate(&records, schema);
    Derived {
        records,
        stats,
        report,
    }
}

/// Hex SHA-256 digest over the serialized derive inputs.
pub fn input_digest(
    table: &RawTable,
    schema: &TargetSchema,
    fields: &FieldMapping,
    categories: &CategoryMappings,
) -> serde_json::Result<String> {
    let mut hasher = Sha256::new();
    for part in [
        serde_json::to_vec(table)?,
        serde_json::to_vec(schema)?,
        serde_json::to_vec(fields)?,
        serde_json::to_vec(categories)?,
    ] {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(&part);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Cached data tagged with the digest of the inputs it came from.
#[derive(Debug, Clone)]
pub struct Memoized<T> {
    pub data: T,
    pub digest: String,
}

impl<T> Memoized<T> {
    #[inline]
    pub fn is_current(&self, digest: &str) -> bool {
        self.digest == digest
    }

    #[inline]
    pub fn is_stale(&self, digest: &str) -> bool {
        !self.is_current(digest)
    }
}
