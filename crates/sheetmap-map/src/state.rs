//! Mapping state for interactive mapping workflows.
//!
//! Holds the column profiles of the current source, the draft field mapping
//! seeded once by the matcher, and the category mappings of enum fields.
//! Edits are validated against the schema and the profiles.

use std::collections::BTreeSet;

use serde::Serialize;
use sheetmap_model::{
    CategoryChoice, CategoryMapping, CategoryMappings, ColumnProfile, FieldDef, FieldMapping,
    MatchOptions, Origin, TargetSchema,
};

use crate::error::{MapError, Result};
use crate::score::{MatchReport, MatchWarning, ScoringEngine};

/// Mapping state of one source.
#[derive(Debug, Clone, Default)]
pub struct MappingState {
    profiles: Vec<ColumnProfile>,
    fields: FieldMapping,
    categories: CategoryMappings,
    report: MatchReport,
}

impl MappingState {
    /// Runs the matcher once and seeds the field mapping.
    pub fn from_profiles(
        schema: &TargetSchema,
        profiles: Vec<ColumnProfile>,
        options: MatchOptions,
    ) -> Self {
        let report = ScoringEngine::new(schema, &profiles, options).suggest();
        let mut fields = FieldMapping::new();
        report.seed(&mut fields);
        Self {
            profiles,
            fields,
            categories: CategoryMappings::new(),
            report,
        }
    }

    pub fn profiles(&self) -> &[ColumnProfile] {
        &self.profiles
    }

    pub fn profile(&self, column: &str) -> Option<&ColumnProfile> {
        self.profiles.iter().find(|p| p.name == column)
    }

    pub fn field_mapping(&self) -> &FieldMapping {
        &self.fields
    }

    pub fn category_mappings(&self) -> &CategoryMappings {
        &self.categories
    }

    pub fn category_mapping(&self, field_key: &str) -> Option<&CategoryMapping> {
        self.categories.get(field_key)
    }

    /// The matcher's original report.
    pub fn match_report(&self) -> &MatchReport {
        &self.report
    }

    /// Column currently mapped to a field.
    pub fn column_for(&self, field_key: &str) -> Option<&str> {
        self.fields.column_for(field_key)
    }

    /// Distinct values of the column mapped to a field.
    pub fn distinct_values_for(&self, field_key: &str) -> Option<&[String]> {
        let column = self.column_for(field_key)?;
        self.profile(column).map(|p| p.distinct.as_slice())
    }

    /// Map a field to a column. The choice is sticky.
    pub fn set_column(
        &mut self,
        schema: &TargetSchema,
        field_key: &str,
        column: &str,
    ) -> Result<()> {
        ensure_field(schema, field_key)?;
        if self.profile(column).is_none() {
            return Err(MapError::ColumnNotFound(column.to_string()));
        }
        self.fields.set_user(field_key, Some(column.to_string()));
        tracing::debug!(field = field_key, column, "Field mapped by user");
        Ok(())
    }

    /// Explicitly unmap a field. The choice is sticky.
    pub fn clear(&mut self, schema: &TargetSchema, field_key: &str) -> Result<()> {
        ensure_field(schema, field_key)?;
        self.fields.set_user(field_key, None);
        tracing::debug!(field = field_key, "Field unmapped by user");
        Ok(())
    }

    /// Record a user category choice for a raw value of an enum field.
    ///
    /// Categories outside the allowed list are accepted here and reported by
    /// the validator.
    pub fn set_category(
        &mut self,
        schema: &TargetSchema,
        field_key: &str,
        raw: &str,
        choice: CategoryChoice,
    ) -> Result<()> {
        self.category_mapping_mut(schema, field_key)?.set_user(raw, choice);
        Ok(())
    }

    /// Category mapping of an enum field, created on first use.
    pub fn category_mapping_mut(
        &mut self,
        schema: &TargetSchema,
        field_key: &str,
    ) -> Result<&mut CategoryMapping> {
        let field = ensure_field(schema, field_key)?;
        if !field.is_enum() {
            return Err(MapError::NotAnEnumField(field_key.to_string()));
        }
        Ok(self.categories.entry(field_key.to_string()).or_default())
    }

    /// Swap in profiles of the same source after rows were added.
    ///
    /// The matcher is not rerun. Assignments to columns that no longer exist
    /// are cleared; their keys are returned.
    pub fn replace_profiles(&mut self, profiles: Vec<ColumnProfile>) -> Vec<String> {
        self.profiles = profiles;
        let columns: BTreeSet<&str> = self.profiles.iter().map(|p| p.name.as_str()).collect();
        let cleared = self.fields.retain_columns(&columns);
        for key in &cleared {
            tracing::warn!(field = %key, "Mapped column vanished; field unmapped");
        }
        cleared
    }

    pub fn status(&self, field_key: &str) -> FieldStatus {
        match self.fields.assignment(field_key) {
            Some(a) if a.column.is_none() => FieldStatus::Unmapped,
            Some(a) if a.origin == Origin::User => FieldStatus::User,
            Some(_) => FieldStatus::Suggested,
            None => FieldStatus::Unmapped,
        }
    }

    /// Warnings that still apply to the current mapping.
    ///
    /// Ambiguity warnings are dropped once the user decides the field;
    /// required fields are checked against the current assignments.
    pub fn warnings(&self, schema: &TargetSchema) -> Vec<MatchWarning> {
        let mut warnings: Vec<MatchWarning> = self
            .report
            .warnings
            .iter()
            .filter(|w| matches!(w, MatchWarning::Ambiguous { .. }))
            .filter(|w| !self.fields.is_user_set(w.field()))
            .cloned()
            .collect();
        warnings.extend(
            schema
                .required_fields()
                .filter(|f| self.column_for(&f.key).is_none())
                .map(|f| MatchWarning::RequiredUnmapped {
                    field: f.key.clone(),
                }),
        );
        warnings
    }

    /// Columns not used by any field, in header order.
    pub fn available_columns(&self) -> Vec<&str> {
        let used = self.fields.used_columns();
        self.profiles
            .iter()
            .map(|p| p.name.as_str())
            .filter(|c| !used.contains(c))
            .collect()
    }

    pub fn summary(&self, schema: &TargetSchema) -> MappingSummary {
        let mut summary = MappingSummary {
            total_fields: schema.fields().len(),
            ..MappingSummary::default()
        };
        for field in schema.fields() {
            let status = self.status(&field.key);
            match status {
                FieldStatus::User => summary.user += 1,
                FieldStatus::Suggested => summary.suggested += 1,
                FieldStatus::Unmapped => {}
            }
            if status != FieldStatus::Unmapped {
                summary.mapped += 1;
            }
            if field.required {
                summary.required_total += 1;
                if status != FieldStatus::Unmapped {
                    summary.required_mapped += 1;
                }
            }
        }
        summary
    }
}

fn ensure_field<'s>(schema: &'s TargetSchema, field_key: &str) -> Result<&'s FieldDef> {
    schema
        .field(field_key)
        .ok_or_else(|| MapError::FieldNotFound(field_key.to_string()))
}

/// Status of a field's mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    /// Mapped by the user.
    User,
    /// Mapped by the matcher.
    Suggested,
    /// No column.
    Unmapped,
}

/// Summary of mapping counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSummary {
    pub total_fields: usize,
    /// Fields with a column, whatever the origin.
    pub mapped: usize,
    pub suggested: usize,
    pub user: usize,
    pub required_total: usize,
    pub required_mapped: usize,
}
