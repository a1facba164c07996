//! Column-to-field matching for spreadsheet imports.
//!
//! [`ScoringEngine`] proposes a column per schema field once per source;
//! [`MappingState`] holds the resulting draft and the user's sticky edits.

pub mod error;
pub mod score;
pub mod state;

pub use error::{MapError, Result};
pub use score::{
    CATEGORICAL_POINTS, ColumnScore, FieldMatch, MatchReport, MatchWarning, SYNONYM_POINTS,
    ScoreComponent, ScoringEngine, TYPE_POINTS,
};
pub use state::{FieldStatus, MappingState, MappingSummary};
