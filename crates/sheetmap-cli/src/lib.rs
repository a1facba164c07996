//! Command-line front end for spreadsheet imports.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod overrides;
pub mod summary;
