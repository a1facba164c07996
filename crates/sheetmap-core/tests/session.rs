//! End-to-end session behaviour.

use proptest::prelude::*;
use sheetmap_core::{Session, SessionError, SessionState, derive};
use sheetmap_model::{
    CategoryChoice, ErrorKind, ImportOptions, Origin, RawRow, RawTable, RawValue, TargetSchema,
};

const HEADERS: [&str; 5] = ["Employee ID", "Name", "Kön", "Lön", "Anställningsform"];

fn text_rows(rows: &[[&str; 5]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| (*c).to_string()).collect())
        .collect()
}

fn source() -> RawTable {
    RawTable::from_text_rows(
        &HEADERS,
        &text_rows(&[
            ["E1", "Anna", "Kvinna", "45000", "Heltid"],
            ["E2", "Bo", "Man", "52 000", "Deltid"],
        ]),
    )
}

fn row(values: [&str; 5]) -> RawRow {
    HEADERS
        .iter()
        .zip(values)
        .map(|(h, v)| ((*h).to_string(), RawValue::from(v)))
        .collect()
}

fn loaded() -> Session {
    let mut session = Session::new(TargetSchema::employee(), ImportOptions::default()).unwrap();
    session.load(source()).unwrap();
    session
}

#[test]
fn load_runs_the_whole_pipeline() {
    let session = loaded();

    assert_eq!(session.state(), SessionState::Validated);
    assert_eq!(session.field_mapping().column_for("gender"), Some("Kön"));
    assert_eq!(
        session.field_mapping().column_for("employment_type"),
        Some("Anställningsform")
    );
    assert_eq!(session.records().len(), 2);
    assert!(session.is_valid());

    let first = &session.records()[0];
    assert_eq!(first.get("gender").and_then(|v| v.as_text()), Some("female"));
    assert_eq!(
        first.get("employment_type").and_then(|v| v.as_text()),
        Some("full_time")
    );
    assert_eq!(
        session.records()[1]
            .get("base_salary_sek")
            .and_then(|v| v.as_number()),
        Some(52000.0)
    );
}

#[test]
fn commit_requires_a_valid_report() {
    let mut session = loaded();
    session.clear_field("employee_id").unwrap();

    let err = session.commit().unwrap_err();
    assert!(matches!(err, SessionError::NotValid { errors: 2 }));
    assert_eq!(session.state(), SessionState::Validated);

    session
        .set_field_mapping("employee_id", "Employee ID")
        .unwrap();
    assert_eq!(session.commit().unwrap().len(), 2);
    assert_eq!(session.state(), SessionState::Committed);

    assert!(matches!(
        session.clear_field("full_name"),
        Err(SessionError::AlreadyCommitted)
    ));
}

#[test]
fn row_limit_is_checked_before_profiling() {
    let mut session =
        Session::new(TargetSchema::employee(), ImportOptions::new().with_max_rows(1)).unwrap();

    let err = session.load(source()).unwrap_err();
    assert!(matches!(
        err,
        SessionError::TooManyRows {
            rows: 2,
            max_rows: 1
        }
    ));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.profiles().is_empty());
}

#[test]
fn ignored_required_value_is_missing_not_invalid() {
    let mut session = loaded();
    session
        .set_category("gender", "Kvinna", CategoryChoice::Ignore)
        .unwrap();

    let report = session.report().unwrap();
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row_index, 1);
    assert_eq!(report.errors[0].field_key, "gender");
    assert_eq!(report.errors[0].kind, ErrorKind::MissingRequired);
}

#[test]
fn out_of_list_user_category_is_reported() {
    let mut session = loaded();
    session.set_category("gender", "Man", "martian").unwrap();

    let report = session.report().unwrap();
    assert_eq!(report.count_by_kind()[&ErrorKind::InvalidEnumValue], 1);
}

#[test]
fn extending_rows_keeps_category_choices() {
    let mut session = loaded();
    session.set_category("gender", "Kvinna", "other").unwrap();

    session
        .extend_rows(vec![row(["E3", "Cleo", "Annat", "48000", "Heltid"])])
        .unwrap();

    let profile = session.mapping().profile("Kön").unwrap();
    assert_eq!(profile.distinct, vec!["Kvinna", "Man", "Annat"]);

    let gender = session.category_mappings().get("gender").unwrap();
    let kvinna = gender.get("Kvinna").unwrap();
    assert_eq!(kvinna.choice, CategoryChoice::from("other"));
    assert_eq!(kvinna.origin, Origin::User);
    let annat = gender.get("Annat").unwrap();
    assert_eq!(annat.choice, CategoryChoice::from("other"));
    assert_eq!(annat.origin, Origin::Suggested);

    assert_eq!(session.records().len(), 3);
    assert_eq!(
        session.records()[0].get("gender").and_then(|v| v.as_text()),
        Some("other")
    );
    assert_eq!(session.state(), SessionState::Validated);
}

#[test]
fn extending_rows_respects_the_row_limit() {
    let mut session =
        Session::new(TargetSchema::employee(), ImportOptions::new().with_max_rows(2)).unwrap();
    session.load(source()).unwrap();

    let err = session
        .extend_rows(vec![row(["E3", "Cleo", "Annat", "48000", "Heltid"])])
        .unwrap_err();
    assert!(matches!(err, SessionError::TooManyRows { rows: 3, .. }));
    assert_eq!(session.records().len(), 2);
}

#[test]
fn remapping_an_enum_field_merges_categories() {
    let table = RawTable::from_text_rows(
        &["Employee ID", "Kön", "Lön", "Typ"],
        &[
            ["E1", "K", "45000", "Timanställd"].map(String::from).to_vec(),
            ["E2", "M", "52000", "Heltid"].map(String::from).to_vec(),
        ],
    );
    let mut session = Session::new(TargetSchema::employee(), ImportOptions::default()).unwrap();
    session.load(table).unwrap();

    session.set_field_mapping("employment_type", "Typ").unwrap();

    let types = session.category_mappings().get("employment_type").unwrap();
    assert_eq!(
        types.resolve("Timanställd"),
        Some(&CategoryChoice::from("hourly"))
    );
    assert_eq!(
        session.records()[1]
            .get("employment_type")
            .and_then(|v| v.as_text()),
        Some("full_time")
    );
    assert!(session.field_mapping().is_user_set("employment_type"));
}

#[test]
fn loading_a_new_source_discards_edits() {
    let mut session = loaded();
    session.set_category("gender", "Man", CategoryChoice::Ignore).unwrap();
    session.clear_field("full_name").unwrap();

    session.load(source()).unwrap();

    assert!(!session.field_mapping().is_user_set("full_name"));
    assert_eq!(
        session.category_mappings()["gender"].get("Man").unwrap().origin,
        Origin::Suggested
    );
}

#[test]
fn edits_before_load_need_a_source() {
    let mut session = Session::new(TargetSchema::employee(), ImportOptions::default()).unwrap();
    assert!(matches!(
        session.clear_field("gender"),
        Err(SessionError::NoSource)
    ));
    assert!(matches!(
        session.extend_rows(Vec::new()),
        Err(SessionError::NoSource)
    ));
}

#[test]
fn snapshot_reports_state_and_counts() {
    let mut session = loaded();
    session.reset();
    let idle = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(idle["state"], "idle");
    assert_eq!(idle["rowCount"], 0);

    session.load(source()).unwrap();
    let snapshot = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(snapshot["state"], "validated");
    assert_eq!(snapshot["rowCount"], 2);
    assert_eq!(snapshot["report"]["isValid"], true);
    assert_eq!(snapshot["summary"]["requiredMapped"], 3);
    assert_eq!(snapshot["profiles"][0]["inferredType"], "string");
    assert!(snapshot["stats"]["defaultsApplied"].is_number());
}

#[test]
fn blank_required_cell_is_one_missing_required() {
    let mut session = Session::new(TargetSchema::employee(), ImportOptions::default()).unwrap();
    session
        .load(RawTable::from_text_rows(
            &HEADERS,
            &text_rows(&[
                ["E1", "Anna", "Kvinna", "45000", "Heltid"],
                ["  ", "Bo", "Man", "52000", "Deltid"],
            ]),
        ))
        .unwrap();

    assert!(session.records()[1].is_null("employee_id"));
    let report = session.report().unwrap();
    assert_eq!(report.errors.len(), 1);
    let error = &report.errors[0];
    assert_eq!(error.row_index, 2);
    assert_eq!(error.field_key, "employee_id");
    assert_eq!(error.kind, ErrorKind::MissingRequired);
}

#[test]
fn empty_source_with_zero_min_score_maps_nothing() {
    let options = ImportOptions::from_json_str(r#"{"matching": {"min_score": 0}}"#).unwrap();
    let mut session = Session::new(TargetSchema::employee(), options).unwrap();
    session.load(RawTable::default()).unwrap();

    assert_eq!(session.state(), SessionState::Validated);
    assert_eq!(session.summary().mapped, 0);
    assert!(session.records().is_empty());
}

#[test]
fn date_shaped_default_on_string_field_stays_text() {
    let schema = TargetSchema::from_json_str(
        r#"{"name": "notes", "fields": [
            {"key": "id", "label": "ID", "type": "string", "required": true, "synonyms": ["employee id"]},
            {"key": "note", "label": "Note", "type": "string", "default": "2024-01-01", "synonyms": ["name"]}
        ]}"#,
    )
    .unwrap();
    let mut session = Session::new(schema, ImportOptions::default()).unwrap();
    session
        .load(RawTable::from_text_rows(
            &HEADERS,
            &text_rows(&[["E1", "", "Kvinna", "45000", "Heltid"]]),
        ))
        .unwrap();

    assert_eq!(session.field_mapping().column_for("note"), Some("Name"));
    assert_eq!(
        session.records()[0].get("note").and_then(|v| v.as_text()),
        Some("2024-01-01")
    );
    assert!(session.is_valid());
}

fn choice() -> impl Strategy<Value = CategoryChoice> {
    prop_oneof![
        Just(CategoryChoice::from("female")),
        Just(CategoryChoice::from("male")),
        Just(CategoryChoice::from("other")),
        Just(CategoryChoice::Ignore),
    ]
}

proptest! {
    #[test]
    fn records_always_equal_a_fresh_derive(
        edits in prop::collection::vec((prop::bool::ANY, choice()), 1..8)
    ) {
        let mut session = loaded();
        for (first, choice) in edits {
            let raw = if first { "Kvinna" } else { "Man" };
            session.set_category("gender", raw, choice).unwrap();
        }

        let fresh = derive(
            session.table().unwrap(),
            session.schema(),
            session.field_mapping(),
            session.category_mappings(),
        );
        prop_assert_eq!(session.records(), fresh.records.as_slice());
        prop_assert_eq!(session.report(), Some(&fresh.report));
    }
}
