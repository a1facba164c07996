//! Error types for spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding a source file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the size limit.
    #[error("file {path} is {size} bytes, limit is {max_size}")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Malformed CSV content.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File holds no bytes at all.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// First row holds no column names.
    #[error("could not detect header row in {path}")]
    NoHeaderDetected { path: PathBuf },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/path/to/staff.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /path/to/staff.csv");
    }
}
