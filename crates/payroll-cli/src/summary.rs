use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use payroll_model::{Batch, FieldOutcome, MatchStatus, Row, ScalarOutcome};

/// Candidates listed per ambiguous field before eliding the rest.
const MAX_CANDIDATES: usize = 5;

pub fn print_summary(batch: &Batch, session: &Path) {
    println!("Session: {}", session.display());
    let summary = batch.summary();

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Valid"),
        header_cell("Invalid"),
        header_cell("Exact"),
        header_cell("Ambiguous"),
        header_cell("Unmatched"),
        header_cell("Invalid scalars"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(summary.rows).add_attribute(Attribute::Bold),
        count_cell(summary.valid_rows, Color::Green),
        count_cell(summary.invalid_rows(), Color::Red),
        dim_cell(summary.exact_fields),
        count_cell(summary.ambiguous_fields, Color::Yellow),
        count_cell(summary.unmatched_fields, Color::Red),
        count_cell(summary.invalid_scalars, Color::Red),
    ]);
    println!("{table}");
    print_review_table(batch);

    if batch.all_valid {
        println!("All rows valid; ready to encode.");
    } else {
        eprintln!(
            "{} row(s) need review; correct them with `reconcile --set ROW:FIELD=VALUE`.",
            summary.invalid_rows()
        );
    }
}

/// One line per field or scalar that keeps its row from being valid.
fn print_review_table(batch: &Batch) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Field"),
        header_cell("Status"),
        header_cell("Value"),
        header_cell("Candidates / note"),
    ]);
    apply_review_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);

    let mut lines = 0usize;
    for row in batch.invalid_rows() {
        for (name, field) in row.fields.iter().filter(|(_, field)| !field.valid) {
            table.add_row(field_line(row, name, field));
            lines += 1;
        }
        for (name, scalar) in row.scalars.iter().filter(|(_, scalar)| !scalar.valid) {
            table.add_row(scalar_line(row, name, scalar));
            lines += 1;
        }
        for issue in &row.issues {
            table.add_row(vec![
                row_cell(row),
                Cell::new(issue.stage.clone()),
                Cell::new("FAILED").fg(Color::Red),
                dim_cell("-"),
                Cell::new(issue.message.clone()),
            ]);
            lines += 1;
        }
    }
    if lines == 0 {
        return;
    }
    println!();
    println!("Needs review:");
    println!("{table}");
}

fn field_line(row: &Row, name: &str, field: &FieldOutcome) -> Vec<Cell> {
    let detail = match (&field.note, field.possible_matches.is_empty()) {
        (Some(note), _) => Cell::new(note.clone()),
        (None, false) => Cell::new(candidate_list(field)),
        (None, true) => dim_cell("-"),
    };
    vec![
        row_cell(row),
        Cell::new(name),
        status_cell(field.status()),
        value_cell(&field.value),
        detail,
    ]
}

fn scalar_line(row: &Row, name: &str, scalar: &ScalarOutcome) -> Vec<Cell> {
    vec![
        row_cell(row),
        Cell::new(name),
        Cell::new("INVALID").fg(Color::Red),
        value_cell(&scalar.value),
        scalar
            .note
            .clone()
            .map_or_else(|| dim_cell("-"), Cell::new),
    ]
}

fn candidate_list(field: &FieldOutcome) -> String {
    let mut shown: Vec<String> = field
        .possible_matches
        .iter()
        .take(MAX_CANDIDATES)
        .map(|record| format!("{} ({})", record.key, record.display_name()))
        .collect();
    let hidden = field.possible_matches.len().saturating_sub(MAX_CANDIDATES);
    if hidden > 0 {
        shown.push(format!("+{hidden} more"));
    }
    shown.join("\n")
}

fn row_cell(row: &Row) -> Cell {
    Cell::new(row.index + 1)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn status_cell(status: MatchStatus) -> Cell {
    match status {
        MatchStatus::Exact => Cell::new("EXACT").fg(Color::Green),
        MatchStatus::Ambiguous => Cell::new("AMBIGUOUS").fg(Color::Yellow),
        MatchStatus::Unmatched => Cell::new("UNMATCHED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn value_cell(value: &str) -> Cell {
    if value.trim().is_empty() {
        dim_cell("(blank)")
    } else {
        Cell::new(value)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_review_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::LowerBoundary(Width::Fixed(11)),
            ColumnConstraint::UpperBoundary(Width::Percentage(25)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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
