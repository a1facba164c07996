//! Target schema definitions.
//!
//! The schema is static configuration: an ordered list of fields the importer
//! can fill. It is created once at start-up and never mutated afterwards.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::mapping::IGNORE;
use crate::record::CanonicalValue;

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Enum,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Enum => "enum",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" => Ok(FieldType::String),
            "number" | "numeric" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "enum" | "category" => Ok(FieldType::Enum),
            _ => Err(format!("Unknown field type: {s}")),
        }
    }
}

/// One classification rule: values matching `pattern` belong to `category`.
///
/// Patterns are case-insensitive regular expressions tested against the
/// trimmed, lowercased raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRuleDef {
    pub pattern: String,
    pub category: String,
}

impl CategoryRuleDef {
    pub fn new(pattern: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            category: category.into(),
        }
    }
}

/// A single field of the target schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Allowed categories, enum fields only. Order matters: the first entry is
    /// the fallback for unrecognised values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<CanonicalValue>,
    /// Keywords searched for in raw column names, in priority order.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Marks an identity-sensitive enum field. Unrecognised values fall back
    /// to this category instead of the first allowed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral_category: Option<String>,
    /// Ordered classification rules, first match wins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_rules: Vec<CategoryRuleDef>,
}

impl FieldDef {
    pub fn new(key: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type,
            required: false,
            allowed: Vec::new(),
            default: None,
            synonyms: Vec::new(),
            neutral_category: None,
            category_rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| (*s).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_allowed(mut self, allowed: &[&str]) -> Self {
        self.allowed = allowed.iter().map(|s| (*s).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: CanonicalValue) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn with_neutral_category(mut self, category: impl Into<String>) -> Self {
        self.neutral_category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: &[(&str, &str)]) -> Self {
        self.category_rules = rules
            .iter()
            .map(|(pattern, category)| CategoryRuleDef::new(*pattern, *category))
            .collect();
        self
    }

    pub fn is_enum(&self) -> bool {
        self.field_type == FieldType::Enum
    }

    pub fn is_identity_sensitive(&self) -> bool {
        self.neutral_category.is_some()
    }

    /// Exact membership test against the allowed list.
    pub fn allows(&self, category: &str) -> bool {
        self.allowed.iter().any(|c| c == category)
    }

    /// Bring the default in line with the declared type.
    ///
    /// JSON defaults are read by shape, so `"2024-01-01"` arrives as a date
    /// even on a string field.
    fn coerce_default(&mut self) -> Result<()> {
        let Some(value) = self.default.take() else {
            return Ok(());
        };
        let coerced = match (self.field_type, &value) {
            (FieldType::String | FieldType::Enum, CanonicalValue::Date(date)) => {
                Some(CanonicalValue::Text(date.to_string()))
            }
            (FieldType::Number, CanonicalValue::Text(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(CanonicalValue::Number),
            (FieldType::Date, CanonicalValue::Text(text)) => text
                .trim()
                .parse::<NaiveDate>()
                .ok()
                .map(CanonicalValue::Date),
            (field_type, value) if value.matches(field_type) => Some(value.clone()),
            _ => None,
        };
        match coerced {
            Some(coerced) => {
                self.default = Some(coerced);
                Ok(())
            }
            None => Err(SchemaError::DefaultTypeMismatch {
                key: self.key.clone(),
                field_type: self.field_type,
                value: value.to_string(),
            }),
        }
    }

    fn validate(&mut self) -> Result<()> {
        self.coerce_default()?;

        let has_category_settings = !self.allowed.is_empty()
            || self.neutral_category.is_some()
            || !self.category_rules.is_empty();

        if !self.is_enum() {
            if has_category_settings {
                return Err(SchemaError::CategoriesOnNonEnum {
                    key: self.key.clone(),
                });
            }
            return Ok(());
        }

        if self.allowed.is_empty() {
            return Err(SchemaError::EnumWithoutCategories {
                key: self.key.clone(),
            });
        }
        if self.allowed.iter().any(|c| c.eq_ignore_ascii_case(IGNORE)) {
            return Err(SchemaError::ReservedCategory {
                key: self.key.clone(),
            });
        }
        if let Some(neutral) = &self.neutral_category
            && !self.allows(neutral)
        {
            return Err(SchemaError::NeutralNotAllowed {
                key: self.key.clone(),
                category: neutral.clone(),
            });
        }
        if let Some(CanonicalValue::Text(value)) = &self.default
            && !self.allows(value)
        {
            return Err(SchemaError::DefaultNotAllowed {
                key: self.key.clone(),
                value: value.clone(),
            });
        }
        for rule in &self.category_rules {
            if !self.allows(&rule.category) {
                return Err(SchemaError::RuleCategoryNotAllowed {
                    key: self.key.clone(),
                    pattern: rule.pattern.clone(),
                    category: rule.category.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The fixed set of fields an import can produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSchema {
    name: String,
    fields: Vec<FieldDef>,
}

impl TargetSchema {
    /// Build a schema, checking field keys and category settings.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Result<Self> {
        let mut schema = Self {
            name: name.into(),
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn enum_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_enum())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.required)
    }

    fn validate(&mut self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty {
                name: self.name.clone(),
            });
        }
        let mut seen = BTreeSet::new();
        for field in &mut self.fields {
            if !seen.insert(field.key.clone()) {
                return Err(SchemaError::DuplicateKey {
                    key: field.key.clone(),
                });
            }
            field.validate()?;
        }
        Ok(())
    }

    /// Built-in employee/payroll schema used for pay-equity imports.
    pub fn employee() -> Self {
        Self {
            name: "employee".to_string(),
            fields: vec![
                FieldDef::new("employee_id", "Employee ID", FieldType::String)
                    .required()
                    .with_synonyms(&[
                        "employee id",
                        "employee_id",
                        "employee no",
                        "employee number",
                        "emp id",
                        "emp_id",
                        "emp no",
                        "staff id",
                        "anställningsnummer",
                        "anställningsnr",
                        "anst nr",
                        "anst.nr",
                        "anstnr",
                        "personalnummer",
                        "medarbetarnummer",
                    ]),
                FieldDef::new("full_name", "Name", FieldType::String)
                    .with_synonyms(&["name", "namn"]),
                FieldDef::new("gender", "Gender", FieldType::Enum)
                    .required()
                    .with_synonyms(&["gender", "sex", "kön", "geschlecht", "sexe", "sexo"])
                    .with_allowed(&["female", "male", "other", "unknown"])
                    .with_neutral_category("unknown")
                    .with_rules(GENDER_RULES),
                FieldDef::new("base_salary_sek", "Base salary (SEK)", FieldType::Number)
                    .required()
                    .with_synonyms(&[
                        "base salary",
                        "salary",
                        "base pay",
                        "lön",
                        "gehalt",
                        "salaire",
                        "salario",
                    ]),
                FieldDef::new("job_title", "Job title", FieldType::String).with_synonyms(&[
                    "job title",
                    "title",
                    "position",
                    "befattning",
                    "titel",
                    "yrke",
                ]),
                FieldDef::new("department", "Department", FieldType::String).with_synonyms(&[
                    "department",
                    "dept",
                    "avdelning",
                    "enhet",
                    "division",
                    "abteilung",
                ]),
                FieldDef::new("employment_type", "Employment type", FieldType::Enum)
                    .with_synonyms(&[
                        "employment type",
                        "contract",
                        "anställningsform",
                        "anställningstyp",
                        "heltid",
                        "deltid",
                    ])
                    .with_allowed(&["full_time", "part_time", "hourly", "temporary"])
                    .with_rules(EMPLOYMENT_TYPE_RULES),
                FieldDef::new("hire_date", "Hire date", FieldType::Date).with_synonyms(&[
                    "hire date",
                    "start date",
                    "hired",
                    "anställningsdatum",
                    "startdatum",
                    "anställd sedan",
                    "eintrittsdatum",
                ]),
                FieldDef::new("work_percent", "Work percentage", FieldType::Number)
                    .with_synonyms(&[
                        "fte",
                        "work percent",
                        "omfattning",
                        "sysselsättningsgrad",
                        "tjänstgöringsgrad",
                    ])
                    .with_default(CanonicalValue::Number(100.0)),
            ],
        }
    }
}

/// Gender spellings and abbreviations (sv, en, de, fr, es).
///
/// "female" precedes "male" so that no pattern family can shadow the other.
pub const GENDER_RULES: &[(&str, &str)] = &[
    (
        r"^(f|k|w|female|woman|women|kvinna|kvinnor|kvinnlig|dam|flicka|weiblich|frau|femme|féminin|femenino|mujer)$",
        "female",
    ),
    (
        r"^(m|male|man|men|män|manlig|herr|pojke|männlich|mann|homme|masculin|masculino|hombre)$",
        "male",
    ),
    (
        r"^(x|other|annat|annan|non-binary|nonbinary|non binary|icke-binär|ickebinär|divers|diverse|autre|otro)$",
        "other",
    ),
    (
        r"^(u|unknown|okänt|okänd|vill ej uppge|prefer not to say|ej angivet|n/a|na|-)$",
        "unknown",
    ),
];

/// Employment contract keywords. Hourly and temporary contracts are tested
/// first because their descriptions often also mention full or part time.
pub const EMPLOYMENT_TYPE_RULES: &[(&str, &str)] = &[
    (
        r"\b(tim|timanställd|timanställning|timavlönad|hourly|per hour|stundenlohn)\b",
        "hourly",
    ),
    (
        r"\b(visstid|visstidsanställd|vikariat|vikarie|provanställning|projektanställning|temp|temporary|fixed[- ]term|befristet)\b",
        "temporary",
    ),
    (
        r"\b(deltid|part[- ]?time|pt|teilzeit|temps partiel|media jornada)\b",
        "part_time",
    ),
    (
        r"\b(heltid|full[- ]?time|ft|vollzeit|temps plein|jornada completa|tillsvidare|permanent)\b",
        "full_time",
    ),
];
