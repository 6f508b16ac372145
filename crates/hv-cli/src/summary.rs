//! Console tables: null inspection and the end-of-run summary.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::pipeline::{NullCount, RunOutcome, RunReport};

/// Null counts of one table, one row per column.
pub fn null_table(table_name: &str, counts: &[NullCount]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(table_name),
        header_cell("Nulls"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for count in counts {
        let nulls = if count.nulls > 0 {
            Cell::new(count.nulls)
                .fg(Color::Yellow)
                .add_attribute(Attribute::Bold)
        } else {
            dim_cell(count.nulls)
        };
        table.add_row(vec![Cell::new(&count.column), nulls, Cell::new(count.rows)]);
    }
    table
}

pub fn print_null_summary(table_name: &str, counts: &[NullCount]) {
    println!("{}", null_table(table_name, counts));
}

/// Stage counts and the load outcome.
pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    for (file, rows) in report.files.iter().zip(&report.long_rows) {
        table.add_row(vec![Cell::new(format!("reshape {file}")), Cell::new(rows)]);
    }
    table.add_row(vec![Cell::new("merged"), Cell::new(report.merged_rows)]);
    table.add_row(vec![Cell::new("regions"), Cell::new(report.regions)]);
    table.add_row(vec![Cell::new("home_values"), Cell::new(report.home_values)]);
    if let Some(dropped) = report.nulls_dropped {
        table.add_row(vec![Cell::new("null values dropped"), Cell::new(dropped)]);
    }
    if let Some(store) = &report.store {
        table.add_row(vec![
            Cell::new("stored regions").fg(Color::Cyan),
            Cell::new(store.regions),
        ]);
        table.add_row(vec![
            Cell::new("stored home_values").fg(Color::Cyan),
            Cell::new(store.home_values),
        ]);
    }
    let outcome = match report.outcome {
        RunOutcome::Committed => Cell::new("committed")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        RunOutcome::CommitDeclined => Cell::new("not committed").fg(Color::Yellow),
    };
    table.add_row(vec![Cell::new("outcome").add_attribute(Attribute::Bold), outcome]);
    table
}

pub fn print_summary(report: &RunReport) {
    println!("Source: {}", report.data_dir.display());
    for path in &report.samples {
        println!("Sample: {}", path.display());
    }
    println!("{}", summary_table(report));
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
