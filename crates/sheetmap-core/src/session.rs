//! Import session state machine.
//!
//! A [`Session`] owns one source table and everything derived from it:
//!
//! ```text
//! Idle -> Profiled -> Mapped -> Categorized -> Normalized -> Validated -> Committed
//! ```
//!
//! The matcher runs once per source. Every later edit goes through
//! [`derive`](crate::derive::derive) again and lands in `Validated`.
//! Loading a new source discards all derived state.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use sheetmap_ingest::profile_columns;
use sheetmap_map::{MappingState, MappingSummary, MatchReport, MatchWarning};
use sheetmap_model::{
    CanonicalRecord, CategoryChoice, CategoryMappings, ColumnProfile, FieldMapping, ImportOptions,
    RawRow, RawTable, TargetSchema, ValidationReport,
};
use sheetmap_transform::{
    CategoryRules, CategorySuggestion, NormalizeStats, compile_schema_rules, suggest_categories,
};

use crate::derive::{Derived, Memoized, derive, input_digest};
use crate::error::{Result, SessionError};

/// Lifecycle stage of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Profiled,
    Mapped,
    Categorized,
    Normalized,
    Validated,
    Committed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Profiled => "profiled",
            Self::Mapped => "mapped",
            Self::Categorized => "categorized",
            Self::Normalized => "normalized",
            Self::Validated => "validated",
            Self::Committed => "committed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One import: a source table, its mappings and the derived records.
#[derive(Debug, Clone)]
pub struct Session {
    schema: TargetSchema,
    options: ImportOptions,
    rules: BTreeMap<String, CategoryRules>,
    state: SessionState,
    table: Option<RawTable>,
    mapping: MappingState,
    suggestions: BTreeMap<String, CategorySuggestion>,
    derived: Option<Memoized<Derived>>,
}

impl Session {
    /// Create an idle session. Fails if a category rule does not compile.
    pub fn new(schema: TargetSchema, options: ImportOptions) -> Result<Self> {
        let rules = compile_schema_rules(&schema)?;
        Ok(Self {
            schema,
            options,
            rules,
            state: SessionState::Idle,
            table: None,
            mapping: MappingState::default(),
            suggestions: BTreeMap::new(),
            derived: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn table(&self) -> Option<&RawTable> {
        self.table.as_ref()
    }

    pub fn mapping(&self) -> &MappingState {
        &self.mapping
    }

    pub fn profiles(&self) -> &[ColumnProfile] {
        self.mapping.profiles()
    }

    pub fn field_mapping(&self) -> &FieldMapping {
        self.mapping.field_mapping()
    }

    pub fn category_mappings(&self) -> &CategoryMappings {
        self.mapping.category_mappings()
    }

    pub fn match_report(&self) -> &MatchReport {
        self.mapping.match_report()
    }

    /// Result of the latest category pass per enum field.
    pub fn category_suggestions(&self) -> &BTreeMap<String, CategorySuggestion> {
        &self.suggestions
    }

    pub fn warnings(&self) -> Vec<MatchWarning> {
        self.mapping.warnings(&self.schema)
    }

    pub fn summary(&self) -> MappingSummary {
        self.mapping.summary(&self.schema)
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        self.derived
            .as_ref()
            .map(|memo| memo.data.records.as_slice())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> Option<NormalizeStats> {
        self.derived.as_ref().map(|memo| memo.data.stats)
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.derived.as_ref().map(|memo| &memo.data.report)
    }

    pub fn is_valid(&self) -> bool {
        self.report().is_some_and(|report| report.is_valid)
    }

    /// Load a source, replacing any previous one, and run the full pipeline.
    ///
    /// The row limit is checked first; on failure the session is unchanged.
    pub fn load(&mut self, table: RawTable) -> Result<()> {
        self.check_row_limit(table.len())?;
        self.reset();

        let profiles = profile_columns(&table, &self.options.profile);
        self.table = Some(table);
        self.transition(SessionState::Profiled);

        self.mapping = MappingState::from_profiles(&self.schema, profiles, self.options.matching);
        for warning in self.mapping.warnings(&self.schema) {
            tracing::warn!(field = warning.field(), "{warning}");
        }
        self.transition(SessionState::Mapped);

        self.suggest_all_categories()?;
        self.transition(SessionState::Categorized);

        self.recompute();
        Ok(())
    }

    /// Append rows of the current source.
    ///
    /// Columns are re-profiled and the matcher is not rerun. Field choices
    /// survive while their column exists; category entries are only added.
    pub fn extend_rows(&mut self, rows: Vec<RawRow>) -> Result<()> {
        self.ensure_editable()?;
        let table = self.table.as_mut().ok_or(SessionError::NoSource)?;
        let total = table.len() + rows.len();
        if total > self.options.max_rows {
            return Err(SessionError::TooManyRows {
                rows: total,
                max_rows: self.options.max_rows,
            });
        }

        let added = rows.len();
        table.extend(rows);
        let profiles = profile_columns(table, &self.options.profile);
        self.mapping.replace_profiles(profiles);
        tracing::info!(added, total, "Extended source rows");

        self.suggest_all_categories()?;
        self.recompute();
        Ok(())
    }

    /// Map a field to a source column.
    pub fn set_field_mapping(&mut self, field_key: &str, column: &str) -> Result<()> {
        self.ensure_loaded()?;
        self.mapping.set_column(&self.schema, field_key, column)?;
        self.suggest_field_categories(field_key)?;
        self.recompute();
        Ok(())
    }

    /// Explicitly leave a field unmapped.
    pub fn clear_field(&mut self, field_key: &str) -> Result<()> {
        self.ensure_loaded()?;
        self.mapping.clear(&self.schema, field_key)?;
        self.recompute();
        Ok(())
    }

    /// Decide the category of one raw value of an enum field.
    pub fn set_category(
        &mut self,
        field_key: &str,
        raw: &str,
        choice: impl Into<CategoryChoice>,
    ) -> Result<()> {
        self.ensure_loaded()?;
        self.mapping
            .set_category(&self.schema, field_key, raw, choice.into())?;
        self.recompute();
        Ok(())
    }

    /// Accept the import. Only a valid report can be committed.
    pub fn commit(&mut self) -> Result<&[CanonicalRecord]> {
        self.ensure_loaded()?;
        let errors = self.report().map_or(0, ValidationReport::error_count);
        if !self.is_valid() {
            return Err(SessionError::NotValid { errors });
        }
        self.transition(SessionState::Committed);
        tracing::info!(records = self.records().len(), "Import committed");
        Ok(self.records())
    }

    /// Drop the source and everything derived from it.
    pub fn reset(&mut self) {
        self.table = None;
        self.mapping = MappingState::default();
        self.suggestions.clear();
        self.derived = None;
        self.state = SessionState::Idle;
    }

    /// Serializable view of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            state: self.state,
            schema: self.schema.name(),
            row_count: self.table.as_ref().map_or(0, RawTable::len),
            profiles: self.profiles(),
            field_mapping: self.field_mapping(),
            category_mappings: self.category_mappings(),
            category_suggestions: &self.suggestions,
            warnings: self.warnings(),
            summary: self.summary(),
            records: self.records(),
            stats: self.stats(),
            report: self.report(),
        }
    }

    fn check_row_limit(&self, rows: usize) -> Result<()> {
        if rows > self.options.max_rows {
            return Err(SessionError::TooManyRows {
                rows,
                max_rows: self.options.max_rows,
            });
        }
        Ok(())
    }

    fn ensure_loaded(&self) -> Result<()> {
        self.ensure_editable()?;
        if self.table.is_none() {
            return Err(SessionError::NoSource);
        }
        Ok(())
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.state == SessionState::Committed {
            return Err(SessionError::AlreadyCommitted);
        }
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "Session state");
        self.state = next;
    }

    fn suggest_all_categories(&mut self) -> Result<()> {
        let keys: Vec<String> = self.schema.enum_fields().map(|f| f.key.clone()).collect();
        for key in &keys {
            self.suggest_field_categories(key)?;
        }
        Ok(())
    }

    /// Merge rule suggestions for the distinct values of the field's column.
    /// Non-enum and unmapped fields are left alone.
    fn suggest_field_categories(&mut self, field_key: &str) -> Result<()> {
        let Some(field) = self.schema.field(field_key) else {
            return Ok(());
        };
        let Some(rules) = self.rules.get(field_key) else {
            return Ok(());
        };
        let Some(distinct) = self
            .mapping
            .distinct_values_for(field_key)
            .map(<[String]>::to_vec)
        else {
            return Ok(());
        };

        let mapping = self.mapping.category_mapping_mut(&self.schema, field_key)?;
        let suggestion =
            suggest_categories(field, rules, &distinct, mapping, &self.options.categories);
        if !suggestion.unclassified.is_empty() {
            tracing::warn!(
                field = field_key,
                count = suggestion.unclassified.len(),
                "Values without a category"
            );
        }
        self.suggestions.insert(field_key.to_string(), suggestion);
        Ok(())
    }

    fn recompute(&mut self) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        let fields = self.mapping.field_mapping();
        let categories = self.mapping.category_mappings();

        let digest = match input_digest(table, &self.schema, fields, categories) {
            Ok(digest) => Some(digest),
            Err(error) => {
                tracing::debug!(%error, "Input digest unavailable; recomputing");
                None
            }
        };

        let current = matches!(
            (&self.derived, &digest),
            (Some(memo), Some(digest)) if memo.is_current(digest)
        );
        if current {
            tracing::debug!("Derived state is current");
        } else {
            let data = derive(table, &self.schema, fields, categories);
            self.derived = Some(Memoized {
                data,
                digest: digest.unwrap_or_default(),
            });
        }
        self.transition(SessionState::Normalized);

        if let Some(report) = self.report() {
            tracing::info!(
                records = self.records().len(),
                errors = report.error_count(),
                valid = report.is_valid,
                "Import recomputed"
            );
        }
        self.transition(SessionState::Validated);
    }
}

/// Serializable view of a session for a presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot<'a> {
    pub state: SessionState,
    pub schema: &'a str,
    pub row_count: usize,
    pub profiles: &'a [ColumnProfile],
    pub field_mapping: &'a FieldMapping,
    pub category_mappings: &'a CategoryMappings,
    pub category_suggestions: &'a BTreeMap<String, CategorySuggestion>,
    pub warnings: Vec<MatchWarning>,
    pub summary: MappingSummary,
    pub records: &'a [CanonicalRecord],
    pub stats: Option<NormalizeStats>,
    pub report: Option<&'a ValidationReport>,
}
