use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use sheetmap_core::Session;
use sheetmap_ingest::{profile_columns, read_csv_table};
use sheetmap_model::{CanonicalRecord, ImportOptions, RawTable, TargetSchema};
use tracing::{info, info_span, trace};

use crate::cli::{ImportArgs, ReportFormatArg, SettingsArgs, SourceArgs};
use crate::logging::redact_value;
use crate::overrides::MappingOverrides;
use crate::summary::{print_import, print_mapping, print_profiles};

/// Schema and options resolved from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub schema: TargetSchema,
    pub options: ImportOptions,
}

impl Settings {
    /// Files first, then flag overrides.
    pub fn from_args(args: &SettingsArgs) -> Result<Self> {
        let schema = match &args.schema {
            Some(path) => TargetSchema::from_json_file(path)
                .with_context(|| format!("load schema {}", path.display()))?,
            None => TargetSchema::employee(),
        };

        let mut options = match &args.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("read config {}", path.display()))?;
                ImportOptions::from_json_str(&json)
                    .with_context(|| format!("parse config {}", path.display()))?
            }
            None => ImportOptions::default(),
        };
        if let Some(max_rows) = args.max_rows {
            options.max_rows = max_rows;
        }
        if let Some(ambiguity) = args.ambiguity {
            options.matching.ambiguity = ambiguity.into();
        }
        if let Some(fallback) = args.fallback {
            options.categories.fallback = fallback.into();
        }
        Ok(Self { schema, options })
    }

    fn session(&self) -> Result<Session> {
        Session::new(self.schema.clone(), self.options.clone()).context("compile category rules")
    }
}

/// Outcome of `import`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub valid: bool,
    pub committed: bool,
    pub records: usize,
}

pub fn run_schema(settings: &Settings) -> Result<()> {
    let json = settings
        .schema
        .to_json_pretty()
        .context("serialize schema")?;
    println!("{json}");
    Ok(())
}

pub fn run_profile(settings: &Settings, args: &SourceArgs) -> Result<()> {
    let table = read_source(&args.file, &settings.options)?;
    let profiles = profile_columns(&table, &settings.options.profile);
    print_profiles(&profiles);
    Ok(())
}

pub fn run_map(settings: &Settings, args: &SourceArgs) -> Result<()> {
    let session = load_session(settings, &args.file)?;
    print_mapping(&session);
    Ok(())
}

pub fn run_import(settings: &Settings, args: &ImportArgs) -> Result<ImportOutcome> {
    let span = info_span!("import", file = %args.file.display());
    let _guard = span.enter();

    let mut session = load_session(settings, &args.file)?;
    if let Some(path) = &args.overrides {
        MappingOverrides::from_json_file(path)?.apply(&mut session)?;
    }
    trace_category_outcomes(&session);

    match args.format {
        ReportFormatArg::Table => print_import(&session),
        ReportFormatArg::Json => {
            let json =
                serde_json::to_string_pretty(&session.snapshot()).context("serialize session")?;
            println!("{json}");
        }
    }

    let valid = session.is_valid();
    let committed = if args.commit {
        session.commit().context("commit import")?;
        true
    } else {
        false
    };

    if let Some(path) = &args.output {
        write_records(path, session.records())?;
        info!(path = %path.display(), "Wrote canonical records");
    }

    Ok(ImportOutcome {
        valid,
        committed,
        records: session.records().len(),
    })
}

fn read_source(path: &Path, options: &ImportOptions) -> Result<RawTable> {
    let table = read_csv_table(path).with_context(|| format!("read {}", path.display()))?;
    if table.len() > options.max_rows {
        anyhow::bail!(
            "{} has {} rows, the limit is {}",
            path.display(),
            table.len(),
            options.max_rows
        );
    }
    Ok(table)
}

fn load_session(settings: &Settings, path: &Path) -> Result<Session> {
    let table = read_csv_table(path).with_context(|| format!("read {}", path.display()))?;
    let mut session = settings.session()?;
    session
        .load(table)
        .with_context(|| format!("load {}", path.display()))?;
    Ok(session)
}

fn trace_category_outcomes(session: &Session) {
    for suggestion in session.category_suggestions().values() {
        for raw in &suggestion.fallback {
            trace!(field = %suggestion.field, value = redact_value(raw), "Fallback category");
        }
        for raw in &suggestion.unclassified {
            trace!(field = %suggestion.field, value = redact_value(raw), "No category");
        }
    }
}

#[derive(Serialize)]
struct RecordsFile<'a> {
    records: &'a [CanonicalRecord],
}

fn write_records(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(&RecordsFile { records })
        .context("serialize records")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
}
