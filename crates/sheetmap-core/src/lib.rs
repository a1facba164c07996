//! Import session for spreadsheet imports.
//!
//! Ties the profiler, matcher, category normalizer, row normalizer and
//! validator together behind a small state machine. Recomputation after a
//! mapping edit is a pure function of the mappings, memoized by digest.

mod error;

pub mod derive;
pub mod session;

pub use derive::{Derived, Memoized, derive, input_digest};
pub use error::{Result, SessionError};
pub use session::{Session, SessionSnapshot, SessionState};
