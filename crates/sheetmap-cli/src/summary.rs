//! Terminal tables for profiles, mappings and validation results.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use sheetmap_core::Session;
use sheetmap_map::FieldStatus;
use sheetmap_model::{CategoryChoice, ColumnProfile, ErrorKind, Origin, ValidationReport};

const SAMPLE_PREVIEW: usize = 3;

pub fn profile_table(profiles: &[ColumnProfile]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Non-empty"),
        header_cell("Distinct"),
        header_cell("Samples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    for profile in profiles {
        let distinct = if profile.distinct_truncated {
            format!("{}+", profile.distinct_count())
        } else {
            profile.distinct_count().to_string()
        };
        let samples = profile
            .samples
            .iter()
            .take(SAMPLE_PREVIEW)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            dim_cell(profile.index + 1),
            Cell::new(&profile.name).add_attribute(Attribute::Bold),
            Cell::new(profile.inferred_type),
            Cell::new(format!("{}/{}", profile.non_empty_count, profile.row_count)),
            Cell::new(distinct),
            if samples.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(samples)
            },
        ]);
    }
    table
}

pub fn mapping_table(session: &Session) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Required"),
        header_cell("Column"),
        header_cell("Status"),
        header_cell("Score"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);

    let mapping = session.mapping();
    for field in session.schema().fields() {
        let status = mapping.status(&field.key);
        let score = session
            .match_report()
            .get(&field.key)
            .filter(|_| status == FieldStatus::Suggested)
            .map(|m| m.score);
        table.add_row(vec![
            Cell::new(&field.key).add_attribute(Attribute::Bold),
            Cell::new(field.field_type),
            if field.required {
                Cell::new("yes").fg(Color::Yellow)
            } else {
                dim_cell("-")
            },
            match mapping.column_for(&field.key) {
                Some(column) => Cell::new(column),
                None => dim_cell("-"),
            },
            status_cell(status, field.required),
            match score {
                Some(score) => Cell::new(score),
                None => dim_cell("-"),
            },
        ]);
    }
    table
}

pub fn category_table(session: &Session) -> Option<Table> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Value"),
        header_cell("Category"),
        header_cell("Origin"),
    ]);
    apply_table_style(&mut table);

    let mut rows = 0usize;
    for (field, mapping) in session.category_mappings() {
        for (raw, entry) in mapping.iter() {
            let category = match &entry.choice {
                CategoryChoice::Category(name) => Cell::new(name),
                CategoryChoice::Ignore => Cell::new("ignore").fg(Color::DarkGrey),
            };
            let origin = match entry.origin {
                Origin::User => Cell::new("user").fg(Color::Green),
                Origin::Suggested => dim_cell("suggested"),
            };
            table.add_row(vec![Cell::new(field), Cell::new(raw), category, origin]);
            rows += 1;
        }
    }
    (rows > 0).then_some(table)
}

pub fn import_summary_table(session: &Session) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Mapped"),
        header_cell("Defaults"),
        header_cell("Unreadable"),
        header_cell("Ignored"),
        header_cell("Undecided"),
        header_cell("Errors"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for index in 0..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let stats = session.stats().unwrap_or_default();
    let summary = session.summary();
    let errors = session.report().map_or(0, ValidationReport::error_count);
    table.add_row(vec![
        Cell::new(stats.rows).add_attribute(Attribute::Bold),
        Cell::new(format!("{}/{}", summary.mapped, summary.total_fields)),
        count_cell(stats.defaults_applied, Color::Blue),
        count_cell(stats.coercion_failures, Color::Yellow),
        count_cell(stats.ignored, Color::Blue),
        count_cell(stats.undecided, Color::Yellow),
        count_cell(errors, Color::Red),
    ]);
    table
}

pub fn error_table(report: &ValidationReport) -> Option<Table> {
    if report.errors.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Field"),
        header_cell("Kind"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);

    for error in &report.errors {
        table.add_row(vec![
            Cell::new(error.row_index),
            Cell::new(&error.field_key),
            kind_cell(error.kind),
            Cell::new(&error.message),
        ]);
    }
    Some(table)
}

pub fn print_profiles(profiles: &[ColumnProfile]) {
    println!("{}", profile_table(profiles));
}

pub fn print_mapping(session: &Session) {
    println!("{}", mapping_table(session));
    print_warnings(session);
}

pub fn print_import(session: &Session) {
    println!("{}", mapping_table(session));
    if let Some(table) = category_table(session) {
        println!();
        println!("Categories:");
        println!("{table}");
    }
    print_warnings(session);
    println!();
    println!("{}", import_summary_table(session));
    if let Some(table) = session.report().and_then(error_table) {
        println!();
        println!("Errors:");
        println!("{table}");
    }
}

fn print_warnings(session: &Session) {
    let warnings = session.warnings();
    if warnings.is_empty() {
        return;
    }
    eprintln!("Warnings:");
    for warning in warnings {
        eprintln!("- {warning}");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: FieldStatus, required: bool) -> Cell {
    match status {
        FieldStatus::User => Cell::new("user").fg(Color::Green),
        FieldStatus::Suggested => Cell::new("suggested").fg(Color::Blue),
        FieldStatus::Unmapped if required => Cell::new("unmapped")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        FieldStatus::Unmapped => dim_cell("unmapped"),
    }
}

fn kind_cell(kind: ErrorKind) -> Cell {
    let color = match kind {
        ErrorKind::MissingRequired => Color::Red,
        ErrorKind::TypeMismatch => Color::Magenta,
        ErrorKind::InvalidEnumValue => Color::Yellow,
    };
    Cell::new(kind.label()).fg(color)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
