//! Per-field checks.
//!
//! Each check returns the error kind and message when the value fails.

pub mod categories;
pub mod required;
pub mod types;
