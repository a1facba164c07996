//! Rule-based classification of categorical raw values.
//!
//! Each enum field carries an ordered list of `{pattern, category}` rules.
//! A raw value is normalized (trim + lowercase) and the first matching rule
//! wins. Unmatched values fall back to the field's neutral category when it
//! is identity-sensitive, otherwise per [`FallbackPolicy`].

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use sheetmap_model::{
    CategoryChoice, CategoryMapping, CategoryOptions, CategoryRuleDef, FallbackPolicy, FieldDef,
    TargetSchema, normalize_category_key,
};

use crate::error::{Result, RuleError};

/// A compiled classification rule.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    regex: Regex,
    category: String,
}

impl CategoryRule {
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

/// Ordered, compiled rules of one enum field.
#[derive(Debug, Clone, Default)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// Compile the rules declared on an enum field.
    pub fn compile(field: &FieldDef) -> Result<Self> {
        if !field.is_enum() {
            return Err(RuleError::NotAnEnumField(field.key.clone()));
        }
        Self::from_defs(&field.key, &field.category_rules, &field.allowed)
    }

    /// Compile rule definitions against an allowed category list.
    pub fn from_defs(
        field_key: &str,
        defs: &[CategoryRuleDef],
        allowed: &[String],
    ) -> Result<Self> {
        let mut rules = Vec::with_capacity(defs.len());
        for def in defs {
            if !allowed.iter().any(|c| c == &def.category) {
                return Err(RuleError::CategoryNotAllowed {
                    field: field_key.to_string(),
                    pattern: def.pattern.clone(),
                    category: def.category.clone(),
                });
            }
            let regex = RegexBuilder::new(&def.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| RuleError::InvalidPattern {
                    field: field_key.to_string(),
                    pattern: def.pattern.clone(),
                    source,
                })?;
            rules.push(CategoryRule {
                regex,
                category: def.category.clone(),
            });
        }
        Ok(Self { rules })
    }

    /// Category of the first rule matching the normalized value.
    pub fn classify(&self, raw: &str) -> Option<&str> {
        let key = normalize_category_key(raw);
        if key.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.regex.is_match(&key))
            .map(CategoryRule::category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Compile the rules of every enum field, keyed by field key.
pub fn compile_schema_rules(schema: &TargetSchema) -> Result<BTreeMap<String, CategoryRules>> {
    schema
        .enum_fields()
        .map(|field| Ok((field.key.clone(), CategoryRules::compile(field)?)))
        .collect()
}

/// Category used for values no rule recognises, if any.
pub fn fallback_category<'f>(field: &'f FieldDef, options: &CategoryOptions) -> Option<&'f str> {
    if let Some(neutral) = &field.neutral_category {
        return Some(neutral.as_str());
    }
    match options.fallback {
        FallbackPolicy::FirstAllowed => field.allowed.first().map(String::as_str),
        FallbackPolicy::Unclassified => None,
    }
}

/// What one classification pass added to a category mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorySuggestion {
    pub field: String,
    /// Newly added entries, raw value to category, in distinct-value order.
    pub added: Vec<(String, String)>,
    /// Raw values among `added` that no rule matched.
    pub fallback: Vec<String>,
    /// Raw values left without an entry.
    pub unclassified: Vec<String>,
}

impl CategorySuggestion {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.unclassified.is_empty()
    }
}

/// Suggest categories for raw values that have no entry yet.
///
/// Existing entries, suggested or set by the user (including ignore), are
/// never touched, so rerunning with a grown distinct list only fills in the
/// new values.
pub fn suggest_categories(
    field: &FieldDef,
    rules: &CategoryRules,
    distinct: &[String],
    mapping: &mut CategoryMapping,
    options: &CategoryOptions,
) -> CategorySuggestion {
    let mut suggestion = CategorySuggestion {
        field: field.key.clone(),
        ..CategorySuggestion::default()
    };
    let fallback = fallback_category(field, options);

    for raw in distinct {
        if raw.trim().is_empty() || mapping.contains(raw) {
            continue;
        }

        let (category, matched) = match rules.classify(raw) {
            Some(category) => (Some(category), true),
            None => (fallback, false),
        };

        match category {
            Some(category) => {
                mapping.insert_suggestion(raw, CategoryChoice::Category(category.to_string()));
                suggestion
                    .added
                    .push((raw.trim().to_string(), category.to_string()));
                if !matched {
                    suggestion.fallback.push(raw.trim().to_string());
                }
            }
            None => suggestion.unclassified.push(raw.trim().to_string()),
        }
    }

    tracing::debug!(
        field = %field.key,
        added = suggestion.added.len(),
        fallback = suggestion.fallback.len(),
        unclassified = suggestion.unclassified.len(),
        "Suggested categories"
    );
    suggestion
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetmap_model::{CategoryEntry, FieldType, Origin};

    fn gender() -> FieldDef {
        TargetSchema::employee().field("gender").unwrap().clone()
    }

    fn employment_type() -> FieldDef {
        TargetSchema::employee()
            .field("employment_type")
            .unwrap()
            .clone()
    }

    fn values(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_gender_spellings() {
        let rules = CategoryRules::compile(&gender()).unwrap();
        for (raw, expected) in [
            ("Kvinna", "female"),
            (" K ", "female"),
            ("Frau", "female"),
            ("Man", "male"),
            ("M", "male"),
            ("Herr", "male"),
            ("Annat", "other"),
            ("Icke-binär", "other"),
            ("Vill ej uppge", "unknown"),
        ] {
            assert_eq!(rules.classify(raw), Some(expected), "{raw}");
        }
        assert_eq!(rules.classify("Mannequin"), None);
        assert_eq!(rules.classify("  "), None);
    }

    #[test]
    fn test_employment_rule_order() {
        let rules = CategoryRules::compile(&employment_type()).unwrap();
        assert_eq!(rules.classify("Heltid"), Some("full_time"));
        assert_eq!(rules.classify("Deltid 50%"), Some("part_time"));
        assert_eq!(rules.classify("Timanställd"), Some("hourly"));
        assert_eq!(rules.classify("Visstid heltid"), Some("temporary"));
        assert_eq!(rules.classify("Full-time"), Some("full_time"));
    }

    #[test]
    fn test_identity_sensitive_fallback_is_neutral() {
        let field = gender();
        let rules = CategoryRules::compile(&field).unwrap();
        let mut mapping = CategoryMapping::new();
        let options = CategoryOptions {
            fallback: FallbackPolicy::Unclassified,
        };

        let suggestion =
            suggest_categories(&field, &rules, &values(&["Zebra"]), &mut mapping, &options);
        assert_eq!(suggestion.fallback, vec!["Zebra"]);
        assert_eq!(
            mapping.resolve("Zebra"),
            Some(&CategoryChoice::Category("unknown".to_string()))
        );
    }

    #[test]
    fn test_first_allowed_fallback() {
        let field = employment_type();
        let rules = CategoryRules::compile(&field).unwrap();
        let mut mapping = CategoryMapping::new();

        let suggestion = suggest_categories(
            &field,
            &rules,
            &values(&["Konsult"]),
            &mut mapping,
            &CategoryOptions::default(),
        );
        assert_eq!(suggestion.added, vec![("Konsult".to_string(), "full_time".to_string())]);
        assert_eq!(suggestion.fallback, vec!["Konsult"]);
    }

    #[test]
    fn test_unclassified_fallback() {
        let field = employment_type();
        let rules = CategoryRules::compile(&field).unwrap();
        let mut mapping = CategoryMapping::new();
        let options = CategoryOptions {
            fallback: FallbackPolicy::Unclassified,
        };

        let suggestion =
            suggest_categories(&field, &rules, &values(&["Konsult"]), &mut mapping, &options);
        assert_eq!(suggestion.unclassified, vec!["Konsult"]);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_merge_preserves_user_entries() {
        let field = gender();
        let rules = CategoryRules::compile(&field).unwrap();
        let mut mapping = CategoryMapping::new();
        mapping.set_user("Man", CategoryChoice::Ignore);

        let suggestion = suggest_categories(
            &field,
            &rules,
            &values(&["Kvinna", "Man"]),
            &mut mapping,
            &CategoryOptions::default(),
        );
        assert_eq!(suggestion.added.len(), 1);
        assert_eq!(
            mapping.get("Man"),
            Some(&CategoryEntry {
                choice: CategoryChoice::Ignore,
                origin: Origin::User,
            })
        );
    }

    #[test]
    fn test_compile_rejects_bad_rules() {
        let allowed = values(&["a", "b"]);
        let bad_category = [CategoryRuleDef::new("^x$", "c")];
        assert!(matches!(
            CategoryRules::from_defs("f", &bad_category, &allowed),
            Err(RuleError::CategoryNotAllowed { .. })
        ));

        let bad_pattern = [CategoryRuleDef::new("(", "a")];
        assert!(matches!(
            CategoryRules::from_defs("f", &bad_pattern, &allowed),
            Err(RuleError::InvalidPattern { .. })
        ));

        let not_enum = FieldDef::new("n", "N", FieldType::Number);
        assert!(matches!(
            CategoryRules::compile(&not_enum),
            Err(RuleError::NotAnEnumField(_))
        ));
    }

    #[test]
    fn test_compile_schema_rules() {
        let rules = compile_schema_rules(&TargetSchema::employee()).unwrap();
        assert_eq!(
            rules.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["employment_type", "gender"]
        );
    }
}
