//! Ingestion for spreadsheet imports.
//!
//! - **profile**: the column profiler (type inference, samples, distinct values)
//! - **shape**: number and date shape detection shared with the row normalizer
//! - **csv**: CSV decoding into a raw table, used by the command-line front end

pub mod csv;
pub mod error;
pub mod profile;
pub mod shape;

pub use csv::{MAX_CSV_FILE_SIZE, read_csv_table};
pub use error::{IngestError, Result};
pub use profile::{infer_type, profile_column, profile_columns};
pub use shape::{
    DATE_PATTERNS, DatePattern, date_format_for, is_date_like, is_number_like, parse_number,
};
