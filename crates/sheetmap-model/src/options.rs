//! Configuration options for an import session.

use serde::{Deserialize, Serialize};

/// Bounds and thresholds of the column profiler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    /// Maximum number of sample values kept per column.
    pub sample_limit: usize,
    /// Maximum number of distinct values kept per column.
    pub distinct_limit: usize,
    /// A type wins when its share of non-empty samples exceeds this ratio.
    pub type_ratio: f64,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            sample_limit: 10,
            distinct_limit: 50,
            type_ratio: 0.7,
        }
    }
}

/// What the matcher does when several columns tie at the winning score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguityPolicy {
    /// Keep the first column in header order and warn.
    #[default]
    PickFirst,
    /// Leave the field unmapped and warn.
    LeaveUnmapped,
}

/// Field matcher settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Minimum score for a suggestion to be accepted.
    pub min_score: u32,
    /// Columns with at most this many distinct values look categorical.
    pub enum_distinct_max: usize,
    pub ambiguity: AmbiguityPolicy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_score: 2,
            enum_distinct_max: 20,
            ambiguity: AmbiguityPolicy::default(),
        }
    }
}

/// Fallback for values no category rule recognises, on fields that are not
/// identity-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Suggest the field's first allowed category.
    #[default]
    FirstAllowed,
    /// Leave the value undecided and report it.
    Unclassified,
}

/// Category normalizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryOptions {
    pub fallback: FallbackPolicy,
}

/// All options of an import session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub profile: ProfileOptions,
    pub matching: MatchOptions,
    pub categories: CategoryOptions,
    /// Largest accepted row count per source.
    pub max_rows: usize,
}

/// Default row limit; the pipeline recomputes every derived artifact on each
/// mapping edit.
pub const DEFAULT_MAX_ROWS: usize = 5_000;

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            profile: ProfileOptions::default(),
            matching: MatchOptions::default(),
            categories: CategoryOptions::default(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    #[must_use]
    pub fn with_ambiguity(mut self, policy: AmbiguityPolicy) -> Self {
        self.matching.ambiguity = policy;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.categories.fallback = policy;
        self
    }
}
