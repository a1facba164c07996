//! CLI argument definitions for the spreadsheet importer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use sheetmap_model::{AmbiguityPolicy, FallbackPolicy};

#[derive(Parser)]
#[command(
    name = "sheetmap",
    version,
    about = "Map spreadsheet exports onto a fixed target schema",
    long_about = "Profile a CSV export, propose a column-to-field mapping, normalize\n\
                  categorical values and validate the resulting records.\n\n\
                  Uses the built-in employee/payroll schema unless --schema is given."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow raw cell values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

/// Schema and import settings shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Target schema as JSON (default: built-in employee schema).
    #[arg(long = "schema", value_name = "PATH", global = true)]
    pub schema: Option<PathBuf>,

    /// Import options as JSON.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Maximum number of source rows.
    #[arg(long = "max-rows", value_name = "N", global = true)]
    pub max_rows: Option<usize>,

    /// What to do when several columns tie for a field.
    #[arg(long = "ambiguity", value_enum, global = true)]
    pub ambiguity: Option<AmbiguityArg>,

    /// Category for values no rule recognises.
    #[arg(long = "fallback", value_enum, global = true)]
    pub fallback: Option<FallbackArg>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the active target schema as JSON.
    Schema,

    /// Profile the columns of a CSV file.
    Profile(SourceArgs),

    /// Propose a field mapping for a CSV file.
    Map(SourceArgs),

    /// Run the full import and validate the records.
    Import(ImportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// CSV file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// CSV file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Mapping overrides as JSON, applied on top of the suggestions.
    #[arg(long = "overrides", value_name = "PATH")]
    pub overrides: Option<PathBuf>,

    /// Write the canonical records as JSON.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format on stdout.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ReportFormatArg,

    /// Commit the import; fails unless the report is valid.
    #[arg(long = "commit")]
    pub commit: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormatArg {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AmbiguityArg {
    PickFirst,
    LeaveUnmapped,
}

impl From<AmbiguityArg> for AmbiguityPolicy {
    fn from(value: AmbiguityArg) -> Self {
        match value {
            AmbiguityArg::PickFirst => AmbiguityPolicy::PickFirst,
            AmbiguityArg::LeaveUnmapped => AmbiguityPolicy::LeaveUnmapped,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FallbackArg {
    FirstAllowed,
    Unclassified,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(value: FallbackArg) -> Self {
        match value {
            FallbackArg::FirstAllowed => FallbackPolicy::FirstAllowed,
            FallbackArg::Unclassified => FallbackPolicy::Unclassified,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
