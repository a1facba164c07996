//! Field and category mappings.
//!
//! Both mappings distinguish suggestions from user choices. User choices are
//! sticky: nothing that merges new suggestions may overwrite them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Reserved spelling of [`CategoryChoice::Ignore`] on the wire.
pub const IGNORE: &str = "ignore";

/// Where a mapping entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Proposed by the matcher or classifier.
    Suggested,
    /// Set explicitly by the user.
    User,
}

/// Assignment of one schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAssignment {
    /// Raw column name, `None` when unmapped.
    pub column: Option<String>,
    pub origin: Origin,
    /// Matcher score for suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// Field key to raw column assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    assignments: BTreeMap<String, FieldAssignment>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapped column of a field, `None` when unmapped or unknown.
    pub fn column_for(&self, key: &str) -> Option<&str> {
        self.assignments
            .get(key)
            .and_then(|a| a.column.as_deref())
    }

    pub fn assignment(&self, key: &str) -> Option<&FieldAssignment> {
        self.assignments.get(key)
    }

    pub fn is_user_set(&self, key: &str) -> bool {
        self.assignments
            .get(key)
            .is_some_and(|a| a.origin == Origin::User)
    }

    /// Record a suggestion. Returns `false` if a user choice is already in place.
    pub fn insert_suggestion(
        &mut self,
        key: impl Into<String>,
        column: Option<String>,
        score: Option<u32>,
    ) -> bool {
        let key = key.into();
        if self.is_user_set(&key) {
            return false;
        }
        self.assignments.insert(
            key,
            FieldAssignment {
                column,
                origin: Origin::Suggested,
                score,
            },
        );
        true
    }

    /// Record a user choice; `None` explicitly unmaps the field.
    pub fn set_user(&mut self, key: impl Into<String>, column: Option<String>) {
        self.assignments.insert(
            key.into(),
            FieldAssignment {
                column,
                origin: Origin::User,
                score: None,
            },
        );
    }

    /// Clear assignments whose column no longer exists. Returns the affected keys.
    pub fn retain_columns(&mut self, columns: &BTreeSet<&str>) -> Vec<String> {
        let mut cleared = Vec::new();
        for (key, assignment) in &mut self.assignments {
            if let Some(column) = &assignment.column
                && !columns.contains(column.as_str())
            {
                assignment.column = None;
                assignment.score = None;
                cleared.push(key.clone());
            }
        }
        cleared
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldAssignment)> {
        self.assignments.iter().map(|(k, a)| (k.as_str(), a))
    }

    /// Number of fields with a column assigned.
    pub fn mapped_count(&self) -> usize {
        self.assignments
            .values()
            .filter(|a| a.column.is_some())
            .count()
    }

    /// Columns referenced by at least one field.
    pub fn used_columns(&self) -> BTreeSet<&str> {
        self.assignments
            .values()
            .filter_map(|a| a.column.as_deref())
            .collect()
    }
}

/// Target of one raw categorical value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryChoice {
    /// Map to this allowed category.
    Category(String),
    /// Never map this raw value to any category.
    Ignore,
}

impl CategoryChoice {
    pub fn category(&self) -> Option<&str> {
        match self {
            CategoryChoice::Category(name) => Some(name),
            CategoryChoice::Ignore => None,
        }
    }
}

impl From<String> for CategoryChoice {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case(IGNORE) {
            CategoryChoice::Ignore
        } else {
            CategoryChoice::Category(value)
        }
    }
}

impl From<&str> for CategoryChoice {
    fn from(value: &str) -> Self {
        CategoryChoice::from(value.to_string())
    }
}

impl From<CategoryChoice> for String {
    fn from(value: CategoryChoice) -> Self {
        match value {
            CategoryChoice::Category(name) => name,
            CategoryChoice::Ignore => IGNORE.to_string(),
        }
    }
}

/// One entry of a category mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub choice: CategoryChoice,
    pub origin: Origin,
}

/// Key normalisation shared by classification and lookup: trim + lowercase.
pub fn normalize_category_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Raw distinct value to category, for one enum field.
///
/// A value without an entry is undecided, which is different from
/// [`CategoryChoice::Ignore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMapping {
    entries: BTreeMap<String, CategoryEntry>,
}

impl CategoryMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, raw: &str) -> Option<&CategoryEntry> {
        self.entries.get(raw.trim())
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw.trim())
    }

    /// Add a suggestion for a value that has no entry yet.
    ///
    /// Returns `false` and leaves the mapping untouched when an entry exists,
    /// whatever its origin.
    pub fn insert_suggestion(&mut self, raw: &str, choice: CategoryChoice) -> bool {
        let key = raw.trim();
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(
            key.to_string(),
            CategoryEntry {
                choice,
                origin: Origin::Suggested,
            },
        );
        true
    }

    pub fn set_user(&mut self, raw: &str, choice: CategoryChoice) {
        self.entries.insert(
            raw.trim().to_string(),
            CategoryEntry {
                choice,
                origin: Origin::User,
            },
        );
    }

    /// Choice for a raw cell value.
    ///
    /// Tries the trimmed value first, then a case-insensitive match.
    pub fn resolve(&self, raw: &str) -> Option<&CategoryChoice> {
        if let Some(entry) = self.get(raw) {
            return Some(&entry.choice);
        }
        let wanted = normalize_category_key(raw);
        self.entries
            .iter()
            .find(|(key, _)| normalize_category_key(key) == wanted)
            .map(|(_, entry)| &entry.choice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Category mappings of all enum fields, keyed by field key.
pub type CategoryMappings = BTreeMap<String, CategoryMapping>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_never_replace_user_choices() {
        let mut mapping = FieldMapping::new();
        mapping.set_user("gender", Some("Sex".to_string()));
        assert!(!mapping.insert_suggestion("gender", Some("Kön".to_string()), Some(3)));
        assert_eq!(mapping.column_for("gender"), Some("Sex"));
    }

    #[test]
    fn explicit_unmap_is_sticky() {
        let mut mapping = FieldMapping::new();
        mapping.set_user("gender", None);
        assert!(!mapping.insert_suggestion("gender", Some("Kön".to_string()), Some(3)));
        assert_eq!(mapping.column_for("gender"), None);
        assert!(mapping.is_user_set("gender"));
    }

    #[test]
    fn retain_columns_clears_vanished_references() {
        let mut mapping = FieldMapping::new();
        mapping.insert_suggestion("a", Some("A".to_string()), Some(2));
        mapping.insert_suggestion("b", Some("B".to_string()), Some(2));
        let columns: BTreeSet<&str> = ["A"].into_iter().collect();
        assert_eq!(mapping.retain_columns(&columns), vec!["b".to_string()]);
        assert_eq!(mapping.column_for("b"), None);
        assert_eq!(mapping.mapped_count(), 1);
    }

    #[test]
    fn category_merge_keeps_existing_entries() {
        let mut mapping = CategoryMapping::new();
        mapping.set_user("Kvinna", CategoryChoice::Ignore);
        assert!(!mapping.insert_suggestion("Kvinna", CategoryChoice::from("female")));
        assert!(mapping.insert_suggestion("Man", CategoryChoice::from("male")));
        assert_eq!(mapping.get("Kvinna").unwrap().choice, CategoryChoice::Ignore);
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn resolve_falls_back_to_case_insensitive_match() {
        let mut mapping = CategoryMapping::new();
        mapping.insert_suggestion("Kvinna", CategoryChoice::from("female"));
        assert_eq!(
            mapping.resolve("  KVINNA "),
            Some(&CategoryChoice::Category("female".to_string()))
        );
        assert_eq!(mapping.resolve("Man"), None);
    }

    #[test]
    fn ignore_round_trips_as_string() {
        let json = serde_json::to_string(&CategoryChoice::Ignore).unwrap();
        assert_eq!(json, r#""ignore""#);
        let choice: CategoryChoice = serde_json::from_str(r#""male""#).unwrap();
        assert_eq!(choice, CategoryChoice::Category("male".to_string()));
    }
}
