//! Integer scoring for column-to-field matching.
//!
//! Each (field, column) pair earns points for a synonym found in the column
//! name, a matching inferred type and, for enum fields, a small distinct-value
//! count. Candidates rank by score, then by original column position.

use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};
use sheetmap_model::{
    AmbiguityPolicy, ColumnProfile, FieldDef, FieldMapping, MatchOptions, TargetSchema,
};

/// Points for a synonym keyword found in the column name.
pub const SYNONYM_POINTS: u32 = 2;
/// Points for an inferred column type equal to the declared field type.
pub const TYPE_POINTS: u32 = 1;
/// Points for a plausibly categorical column on an enum field.
pub const CATEGORICAL_POINTS: u32 = 1;

/// Score for a single column-field pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnScore {
    pub column: String,
    /// Original header position, the tie-break key.
    pub index: usize,
    pub score: u32,
    /// Breakdown of score components for explainability.
    pub explanation: Vec<ScoreComponent>,
}

impl ColumnScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        if self.explanation.is_empty() {
            return "no evidence".to_string();
        }
        self.explanation
            .iter()
            .map(|c| format!("{} +{} ({})", c.name, c.points, c.description))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A component contributing to the final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    /// Component name (e.g., "Synonym").
    pub name: &'static str,
    pub points: u32,
    pub description: String,
}

/// The matcher's decision for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub field: String,
    /// Accepted column, `None` when the field stays unmapped.
    pub column: Option<String>,
    /// Best score seen for this field, accepted or not.
    pub score: u32,
    /// Every column tied at the best score, in header order.
    pub tied: Vec<String>,
}

/// Non-blocking conditions surfaced to whoever edits the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MatchWarning {
    /// Several columns tied at the winning score.
    Ambiguous {
        field: String,
        columns: Vec<String>,
        score: u32,
        /// Column kept under [`AmbiguityPolicy::PickFirst`].
        chosen: Option<String>,
    },
    /// A required field has no column.
    RequiredUnmapped { field: String },
}

impl MatchWarning {
    pub fn field(&self) -> &str {
        match self {
            Self::Ambiguous { field, .. } | Self::RequiredUnmapped { field } => field,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Ambiguous {
                field,
                columns,
                score,
                chosen,
            } => {
                let listed = columns
                    .iter()
                    .map(|c| format!("'{c}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                match chosen {
                    Some(column) => format!(
                        "{field}: columns {listed} all score {score}; using '{column}'"
                    ),
                    None => format!(
                        "{field}: columns {listed} all score {score}; left unmapped"
                    ),
                }
            }
            Self::RequiredUnmapped { field } => {
                format!("{field}: required field has no column")
            }
        }
    }
}

impl fmt::Display for MatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Result of one matcher run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// One entry per schema field, in schema order.
    pub matches: Vec<FieldMatch>,
    pub warnings: Vec<MatchWarning>,
}

impl MatchReport {
    pub fn get(&self, field: &str) -> Option<&FieldMatch> {
        self.matches.iter().find(|m| m.field == field)
    }

    /// Seeds a field mapping. User choices already in `mapping` are kept.
    pub fn seed(&self, mapping: &mut FieldMapping) {
        for m in &self.matches {
            let score = m.column.as_ref().map(|_| m.score);
            mapping.insert_suggestion(m.field.clone(), m.column.clone(), score);
        }
    }
}

/// Engine for scoring column-to-field matches.
#[derive(Debug, Clone)]
pub struct ScoringEngine<'a> {
    schema: &'a TargetSchema,
    profiles: &'a [ColumnProfile],
    options: MatchOptions,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(
        schema: &'a TargetSchema,
        profiles: &'a [ColumnProfile],
        options: MatchOptions,
    ) -> Self {
        Self {
            schema,
            profiles,
            options,
        }
    }

    /// Score a single column against a field.
    ///
    /// Returns `None` if either does not exist.
    pub fn score(&self, column: &str, field_key: &str) -> Option<ColumnScore> {
        let field = self.schema.field(field_key)?;
        let profile = self.profiles.iter().find(|p| p.name == column)?;
        Some(self.compute_score(profile, field))
    }

    /// Score all columns against a field, best first.
    ///
    /// Ties keep header order.
    pub fn score_all_for_field(&self, field_key: &str) -> Vec<ColumnScore> {
        match self.schema.field(field_key) {
            Some(field) => self.rank(field),
            None => Vec::new(),
        }
    }

    /// Runs the matcher over every schema field.
    ///
    /// Fields are matched independently; the same column may win several
    /// fields.
    pub fn suggest(&self) -> MatchReport {
        let mut report = MatchReport::default();

        for field in self.schema.fields() {
            let ranked = self.rank(field);
            let best_score = ranked.first().map_or(0, |c| c.score);

            if ranked.is_empty() || best_score < self.options.min_score {
                tracing::debug!(field = %field.key, best_score, "No column accepted");
                if field.required {
                    report.warnings.push(MatchWarning::RequiredUnmapped {
                        field: field.key.clone(),
                    });
                }
                report.matches.push(FieldMatch {
                    field: field.key.clone(),
                    column: None,
                    score: best_score,
                    tied: Vec::new(),
                });
                continue;
            }

            let tied: Vec<String> = ranked
                .iter()
                .take_while(|c| c.score == best_score)
                .map(|c| c.column.clone())
                .collect();

            let column = if tied.len() > 1 {
                let chosen = match self.options.ambiguity {
                    AmbiguityPolicy::PickFirst => tied.first().cloned(),
                    AmbiguityPolicy::LeaveUnmapped => None,
                };
                tracing::warn!(
                    field = %field.key,
                    candidates = tied.len(),
                    score = best_score,
                    "Ambiguous column match"
                );
                report.warnings.push(MatchWarning::Ambiguous {
                    field: field.key.clone(),
                    columns: tied.clone(),
                    score: best_score,
                    chosen: chosen.clone(),
                });
                chosen
            } else {
                tied.first().cloned()
            };

            if column.is_none() && field.required {
                report.warnings.push(MatchWarning::RequiredUnmapped {
                    field: field.key.clone(),
                });
            }

            tracing::debug!(
                field = %field.key,
                column = column.as_deref().unwrap_or("-"),
                score = best_score,
                "Matched field"
            );
            report.matches.push(FieldMatch {
                field: field.key.clone(),
                column,
                score: best_score,
                tied,
            });
        }

        tracing::info!(
            fields = report.matches.len(),
            mapped = report.matches.iter().filter(|m| m.column.is_some()).count(),
            warnings = report.warnings.len(),
            "Suggested field mapping"
        );
        report
    }

    fn rank(&self, field: &FieldDef) -> Vec<ColumnScore> {
        let mut scores: Vec<ColumnScore> = self
            .profiles
            .iter()
            .map(|profile| self.compute_score(profile, field))
            .collect();
        scores.sort_by_key(|s| (Reverse(s.score), s.index));
        scores
    }

    fn compute_score(&self, profile: &ColumnProfile, field: &FieldDef) -> ColumnScore {
        let mut components = Vec::new();
        let name = profile.name.trim().to_lowercase();

        if let Some(synonym) = field
            .synonyms
            .iter()
            .map(|s| s.trim().to_lowercase())
            .find(|s| !s.is_empty() && name.contains(s.as_str()))
        {
            components.push(ScoreComponent {
                name: "Synonym",
                points: SYNONYM_POINTS,
                description: format!("'{}' contains '{synonym}'", profile.name),
            });
        }

        if profile.inferred_type.matches(field.field_type) {
            components.push(ScoreComponent {
                name: "Type",
                points: TYPE_POINTS,
                description: format!("column is {}", profile.inferred_type),
            });
        }

        if field.is_enum() && profile.distinct_count() <= self.options.enum_distinct_max {
            components.push(ScoreComponent {
                name: "Categorical",
                points: CATEGORICAL_POINTS,
                description: format!("{} distinct values", profile.distinct_count()),
            });
        }

        ColumnScore {
            column: profile.name.clone(),
            index: profile.index,
            score: components.iter().map(|c| c.points).sum(),
            explanation: components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetmap_model::{ColumnType, FieldType};

    fn profile(name: &str, index: usize, inferred_type: ColumnType, distinct: &[&str]) -> ColumnProfile {
        ColumnProfile {
            name: name.to_string(),
            index,
            inferred_type,
            samples: distinct.iter().map(|s| (*s).to_string()).collect(),
            distinct: distinct.iter().map(|s| (*s).to_string()).collect(),
            distinct_truncated: false,
            row_count: distinct.len(),
            non_empty_count: distinct.len(),
        }
    }

    fn schema() -> TargetSchema {
        TargetSchema::new(
            "test",
            vec![
                FieldDef::new("salary", "Salary", FieldType::Number)
                    .required()
                    .with_synonyms(&["salary", "lön"]),
                FieldDef::new("level", "Level", FieldType::Enum)
                    .with_synonyms(&["level"])
                    .with_allowed(&["low", "high"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_score_components() {
        let schema = schema();
        let profiles = vec![profile("Monthly Salary", 0, ColumnType::Number, &["1"])];
        let engine = ScoringEngine::new(&schema, &profiles, MatchOptions::default());

        let score = engine.score("Monthly Salary", "salary").unwrap();
        assert_eq!(score.score, 3);
        assert!(score.explain().contains("Synonym +2"));
        assert!(engine.score("Monthly Salary", "nope").is_none());
        assert!(engine.score("nope", "salary").is_none());
    }

    #[test]
    fn test_type_alone_is_not_enough() {
        let schema = schema();
        let profiles = vec![profile("Amount", 0, ColumnType::Number, &["1"])];
        let engine = ScoringEngine::new(&schema, &profiles, MatchOptions::default());

        let report = engine.suggest();
        let salary = report.get("salary").unwrap();
        assert_eq!(salary.column, None);
        assert_eq!(salary.score, 1);
        assert!(report
            .warnings
            .contains(&MatchWarning::RequiredUnmapped { field: "salary".to_string() }));
    }

    #[test]
    fn test_categorical_bonus_only_for_enums() {
        let schema = schema();
        let profiles = vec![profile("Level", 0, ColumnType::String, &["low", "high"])];
        let engine = ScoringEngine::new(&schema, &profiles, MatchOptions::default());

        assert_eq!(engine.score("Level", "level").unwrap().score, 3);
    }

    #[test]
    fn test_tie_breaks_by_header_position() {
        let schema = schema();
        let profiles = vec![
            profile("Other", 0, ColumnType::String, &["x"]),
            profile("Lön 2023", 1, ColumnType::Number, &["1"]),
            profile("Lön 2024", 2, ColumnType::Number, &["2"]),
        ];
        let engine = ScoringEngine::new(&schema, &profiles, MatchOptions::default());

        let ranked = engine.score_all_for_field("salary");
        assert_eq!(ranked[0].column, "Lön 2023");
        assert_eq!(ranked[1].column, "Lön 2024");

        let report = engine.suggest();
        let salary = report.get("salary").unwrap();
        assert_eq!(salary.column.as_deref(), Some("Lön 2023"));
        assert_eq!(salary.tied, vec!["Lön 2023", "Lön 2024"]);
        assert!(matches!(
            report.warnings.first(),
            Some(MatchWarning::Ambiguous { chosen: Some(c), .. }) if c == "Lön 2023"
        ));
    }

    #[test]
    fn test_leave_unmapped_on_ambiguity() {
        let schema = schema();
        let profiles = vec![
            profile("Lön 2023", 0, ColumnType::Number, &["1"]),
            profile("Lön 2024", 1, ColumnType::Number, &["2"]),
        ];
        let options = MatchOptions {
            ambiguity: AmbiguityPolicy::LeaveUnmapped,
            ..MatchOptions::default()
        };
        let engine = ScoringEngine::new(&schema, &profiles, options);

        let report = engine.suggest();
        assert_eq!(report.get("salary").unwrap().column, None);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_zero_min_score_without_columns() {
        let schema = schema();
        let options = MatchOptions {
            min_score: 0,
            ..MatchOptions::default()
        };
        let engine = ScoringEngine::new(&schema, &[], options);

        let report = engine.suggest();
        assert!(report.matches.iter().all(|m| m.column.is_none() && m.tied.is_empty()));
        assert_eq!(
            report.warnings,
            vec![MatchWarning::RequiredUnmapped { field: "salary".to_string() }]
        );
    }

    #[test]
    fn test_warning_message() {
        let warning = MatchWarning::Ambiguous {
            field: "salary".to_string(),
            columns: vec!["A".to_string(), "B".to_string()],
            score: 3,
            chosen: Some("A".to_string()),
        };
        assert_eq!(
            warning.to_string(),
            "salary: columns 'A', 'B' all score 3; using 'A'"
        );
    }
}
