//! Column profiling: type inference and bounded sample/distinct collection.

use std::collections::BTreeSet;

use sheetmap_model::{ColumnProfile, ColumnType, ProfileOptions, RawTable};

use crate::shape::{is_date_like, is_number_like};

/// Profiles every header of `table`, in header order.
pub fn profile_columns(table: &RawTable, options: &ProfileOptions) -> Vec<ColumnProfile> {
    let profiles: Vec<ColumnProfile> = table
        .headers
        .iter()
        .enumerate()
        .map(|(index, name)| profile_column(table, index, name, options))
        .collect();

    tracing::info!(
        columns = profiles.len(),
        rows = table.len(),
        "Profiled source columns"
    );
    profiles
}

/// Profiles a single column.
///
/// Samples are the first non-empty values in row order. The distinct list is
/// capped; once full, further unseen values only set `distinct_truncated`.
pub fn profile_column(
    table: &RawTable,
    index: usize,
    name: &str,
    options: &ProfileOptions,
) -> ColumnProfile {
    let mut samples = Vec::with_capacity(options.sample_limit);
    let mut distinct = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut distinct_truncated = false;
    let mut non_empty_count = 0usize;

    for row in 0..table.len() {
        let value = table.value(row, name);
        if value.is_empty() {
            continue;
        }
        non_empty_count += 1;

        let text = value.to_text();
        let trimmed = text.trim();

        if samples.len() < options.sample_limit {
            samples.push(trimmed.to_string());
        }

        if !seen.contains(trimmed) {
            if seen.len() < options.distinct_limit {
                seen.insert(trimmed.to_string());
                distinct.push(trimmed.to_string());
            } else {
                distinct_truncated = true;
            }
        }
    }

    let inferred_type = infer_type(&samples, options.type_ratio);

    tracing::debug!(
        column = name,
        index,
        inferred_type = %inferred_type,
        distinct = distinct.len(),
        distinct_truncated,
        non_empty = non_empty_count,
        "Profiled column"
    );

    ColumnProfile {
        name: name.to_string(),
        index,
        inferred_type,
        samples,
        distinct,
        distinct_truncated,
        row_count: table.len(),
        non_empty_count,
    }
}

/// Infers a column type by majority vote over the non-empty samples.
///
/// Number wins if its share exceeds `type_ratio`, then date; everything else,
/// including an empty sample window, is a string.
pub fn infer_type<S: AsRef<str>>(samples: &[S], type_ratio: f64) -> ColumnType {
    let non_empty: Vec<&str> = samples
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if non_empty.is_empty() {
        return ColumnType::String;
    }

    let total = non_empty.len() as f64;
    let ratio = |count: usize| count as f64 / total;

    let numbers = non_empty.iter().filter(|s| is_number_like(s)).count();
    if ratio(numbers) > type_ratio {
        return ColumnType::Number;
    }

    let dates = non_empty.iter().filter(|s| is_date_like(s)).count();
    if ratio(dates) > type_ratio {
        return ColumnType::Date;
    }

    ColumnType::String
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sheetmap_model::{RawRow, RawValue};

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let records: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|c| (*c).to_string()).collect())
            .collect();
        RawTable::from_text_rows(headers, &records)
    }

    #[test]
    fn test_infer_type_majority() {
        assert_eq!(infer_type(&["45000", "52 000", "1 234,56"], 0.7), ColumnType::Number);
        assert_eq!(infer_type(&["2024-01-15", "15.02.2023"], 0.7), ColumnType::Date);
        assert_eq!(infer_type(&["Kvinna", "Man"], 0.7), ColumnType::String);
        // 7 of 10 is not more than 0.7
        let mixed = ["1", "2", "3", "4", "5", "6", "7", "a", "b", "c"];
        assert_eq!(infer_type(&mixed, 0.7), ColumnType::String);
        let mostly = ["1", "2", "3", "4", "5", "6", "7", "8", "b", "c"];
        assert_eq!(infer_type(&mostly, 0.7), ColumnType::Number);
    }

    #[test]
    fn test_infer_type_ignores_empty_samples() {
        assert_eq!(infer_type(&["", " ", "12"], 0.7), ColumnType::Number);
        assert_eq!(infer_type::<&str>(&[], 0.7), ColumnType::String);
        assert_eq!(infer_type(&["", "  "], 0.7), ColumnType::String);
    }

    #[test]
    fn test_profile_columns_basic() {
        let table = table(
            &["Employee ID", "Kön", "Lön"],
            &[
                &["E1", "Kvinna", "45000"],
                &["E2", "Man", "52000"],
                &["E3", " Kvinna ", ""],
            ],
        );
        let profiles = profile_columns(&table, &ProfileOptions::default());

        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[1].name, "Kön");
        assert_eq!(profiles[1].index, 1);
        assert_eq!(profiles[1].inferred_type, ColumnType::String);
        assert_eq!(profiles[1].distinct, vec!["Kvinna", "Man"]);
        assert_eq!(profiles[2].inferred_type, ColumnType::Number);
        assert_eq!(profiles[2].non_empty_count, 2);
        assert_eq!(profiles[2].row_count, 3);
    }

    #[test]
    fn test_profile_lists_are_bounded() {
        let records: Vec<Vec<String>> = (0..200).map(|i| vec![format!("v{i}")]).collect();
        let table = RawTable::from_text_rows(&["code"], &records);
        let profile = &profile_columns(&table, &ProfileOptions::default())[0];

        assert_eq!(profile.samples.len(), 10);
        assert_eq!(profile.distinct.len(), 50);
        assert!(profile.distinct_truncated);
        assert_eq!(profile.samples[0], "v0");
    }

    #[test]
    fn test_profile_decoded_values() {
        let mut table = RawTable::new(vec!["hired".to_string(), "pay".to_string()], Vec::new());
        for day in 1..=3 {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            table.extend([RawRow::from([
                ("hired".to_string(), RawValue::Date(date)),
                ("pay".to_string(), RawValue::Number(f64::from(day) * 1000.0)),
            ])]);
        }
        let profiles = profile_columns(&table, &ProfileOptions::default());

        assert_eq!(profiles[0].inferred_type, ColumnType::Date);
        assert_eq!(profiles[1].inferred_type, ColumnType::Number);
        assert_eq!(profiles[1].samples[0], "1000");
    }

    #[test]
    fn test_all_empty_column_is_string() {
        let table = table(&["blank"], &[&[""], &["  "]]);
        let profile = &profile_columns(&table, &ProfileOptions::default())[0];

        assert_eq!(profile.inferred_type, ColumnType::String);
        assert!(profile.is_empty());
        assert!((profile.null_ratio() - 1.0).abs() < f64::EPSILON);
    }
}
