//! Error types for import sessions.

use sheetmap_map::MapError;
use sheetmap_transform::RuleError;
use thiserror::Error;

/// Errors raised by [`Session`](crate::Session) operations.
///
/// Malformed data never produces one of these; it ends up in the validation
/// report instead.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Source exceeds the configured row limit.
    #[error("source has {rows} rows, the limit is {max_rows}")]
    TooManyRows { rows: usize, max_rows: usize },

    /// Operation needs a loaded source.
    #[error("no source loaded")]
    NoSource,

    /// Commit attempted while the report has errors.
    #[error("import is not valid ({errors} validation errors)")]
    NotValid { errors: usize },

    /// Edit attempted after commit.
    #[error("import already committed")]
    AlreadyCommitted,

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Rules(#[from] RuleError),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
