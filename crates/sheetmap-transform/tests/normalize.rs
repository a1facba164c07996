//! Category classification and row normalization end to end.

use proptest::prelude::*;
use sheetmap_model::{
    CanonicalValue, CategoryChoice, CategoryMapping, CategoryMappings, CategoryOptions,
    FieldMapping, RawTable, TargetSchema,
};
use sheetmap_transform::{CategoryRules, normalize_rows, suggest_categories};

fn values(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn classifies_swedish_gender_values() {
    let schema = TargetSchema::employee();
    let field = schema.field("gender").unwrap();
    let rules = CategoryRules::compile(field).unwrap();
    let mut mapping = CategoryMapping::new();

    let suggestion = suggest_categories(
        field,
        &rules,
        &values(&["Kvinna", "Man", "Annat"]),
        &mut mapping,
        &CategoryOptions::default(),
    );

    insta::assert_json_snapshot!(mapping, @r#"
    {
      "Annat": {
        "choice": "other",
        "origin": "suggested"
      },
      "Kvinna": {
        "choice": "female",
        "origin": "suggested"
      },
      "Man": {
        "choice": "male",
        "origin": "suggested"
      }
    }
    "#);
    assert!(suggestion.fallback.is_empty());
    assert!(suggestion.unclassified.is_empty());
}

#[test]
fn grown_distinct_list_only_fills_new_values() {
    let schema = TargetSchema::employee();
    let field = schema.field("gender").unwrap();
    let rules = CategoryRules::compile(field).unwrap();
    let mut mapping = CategoryMapping::new();
    let options = CategoryOptions::default();

    suggest_categories(field, &rules, &values(&["Kvinna", "Man"]), &mut mapping, &options);
    mapping.set_user("Kvinna", CategoryChoice::Ignore);
    mapping.set_user("Man", CategoryChoice::from("other"));

    let second = suggest_categories(
        field,
        &rules,
        &values(&["Kvinna", "Man", "Annat"]),
        &mut mapping,
        &options,
    );

    assert_eq!(second.added, vec![("Annat".to_string(), "other".to_string())]);
    assert_eq!(mapping.resolve("Kvinna"), Some(&CategoryChoice::Ignore));
    assert_eq!(
        mapping.resolve("Man"),
        Some(&CategoryChoice::Category("other".to_string()))
    );
}

fn salary_table(cells: &[String]) -> RawTable {
    let records: Vec<Vec<String>> = cells
        .iter()
        .enumerate()
        .map(|(i, c)| vec![format!("E{i}"), c.clone(), "Kvinna".to_string()])
        .collect();
    RawTable::from_text_rows(&["Anst.nr", "Lön", "Kön"], &records)
}

fn payroll_mapping() -> (FieldMapping, CategoryMappings) {
    let mut fields = FieldMapping::new();
    fields.insert_suggestion("employee_id", Some("Anst.nr".to_string()), Some(3));
    fields.insert_suggestion("base_salary_sek", Some("Lön".to_string()), Some(3));
    fields.insert_suggestion("gender", Some("Kön".to_string()), Some(3));
    let mut gender = CategoryMapping::new();
    gender.insert_suggestion("Kvinna", CategoryChoice::from("female"));
    (fields, CategoryMappings::from([("gender".to_string(), gender)]))
}

#[test]
fn decimal_comma_salary_becomes_a_number() {
    let schema = TargetSchema::employee();
    let (fields, categories) = payroll_mapping();
    let table = salary_table(&["1 234,56".to_string()]);

    let (records, stats) = normalize_rows(&table, &schema, &fields, &categories);

    assert_eq!(
        records[0].get("base_salary_sek"),
        Some(&CanonicalValue::Number(1234.56))
    );
    assert_eq!(records[0].get("gender"), Some(&CanonicalValue::from("female")));
    assert_eq!(stats.coercion_failures, 0);
}

proptest! {
    #[test]
    fn normalization_is_idempotent_and_order_preserving(
        cells in prop::collection::vec("[0-9 ,.a-z]{0,10}", 0..40)
    ) {
        let schema = TargetSchema::employee();
        let (fields, categories) = payroll_mapping();
        let table = salary_table(&cells);

        let (first, first_stats) = normalize_rows(&table, &schema, &fields, &categories);
        let (second, second_stats) = normalize_rows(&table, &schema, &fields, &categories);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first_stats, second_stats);
        prop_assert_eq!(first.len(), cells.len());
        for (i, record) in first.iter().enumerate() {
            let expected = CanonicalValue::Text(format!("E{i}"));
            prop_assert_eq!(record.get("employee_id"), Some(&expected));
        }
    }
}
