//! Data model for spreadsheet imports.
//!
//! - **schema**: the fixed target schema and its field definitions
//! - **raw**: rows handed over by the file decoder
//! - **profile**: per-column profiles
//! - **mapping**: field and category mappings with sticky user choices
//! - **record**: canonical typed records
//! - **report**: validation report
//! - **options**: session configuration

pub mod error;
pub mod mapping;
pub mod options;
pub mod profile;
pub mod raw;
pub mod record;
pub mod report;
pub mod schema;

pub use error::{Result, SchemaError};
pub use mapping::{
    CategoryChoice, CategoryEntry, CategoryMapping, CategoryMappings, FieldAssignment,
    FieldMapping, IGNORE, Origin, normalize_category_key,
};
pub use options::{
    AmbiguityPolicy, CategoryOptions, DEFAULT_MAX_ROWS, FallbackPolicy, ImportOptions,
    MatchOptions, ProfileOptions,
};
pub use profile::{ColumnProfile, ColumnType};
pub use raw::{RawRow, RawTable, RawValue};
pub use record::{CanonicalRecord, CanonicalValue};
pub use report::{ErrorKind, ValidationError, ValidationReport};
pub use schema::{
    CategoryRuleDef, EMPLOYMENT_TYPE_RULES, FieldDef, FieldType, GENDER_RULES, TargetSchema,
};
