use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fuzzjoin_cli::pipeline::JoinOutcome;
use fuzzjoin_match::JoinConfig;

/// Prints the join summary to stderr; stdout may carry the joined rows.
pub fn print_summary(outcome: &JoinOutcome, config: &JoinConfig) {
    eprintln!("Left: {}", outcome.left_name);
    eprintln!("Right: {}", outcome.right_name);
    for path in &outcome.outputs {
        eprintln!("Output: {}", path.display());
    }
    eprintln!(
        "Metric: {} | Threshold: {} | Cardinality: {} | Blocking: {}",
        config.metric, config.threshold, config.cardinality, config.blocking
    );
    eprintln!("{}", summary_table(outcome));
    if outcome.result.truncated {
        eprintln!(
            "warning: time budget exhausted; only {} of {} left records were matched",
            outcome.result.summary.left_scanned, outcome.result.summary.left_records
        );
    }
}

pub fn summary_table(outcome: &JoinOutcome) -> Table {
    let summary = &outcome.result.summary;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Statistic"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![Cell::new("Left records"), Cell::new(summary.left_records)]);
    table.add_row(vec![Cell::new("Right records"), Cell::new(summary.right_records)]);
    table.add_row(vec![
        Cell::new("Left records scanned"),
        scanned_cell(summary.left_scanned, summary.left_records),
    ]);
    table.add_row(vec![
        Cell::new("Candidate pairs scored"),
        Cell::new(summary.candidates_scored),
    ]);
    table.add_row(vec![
        Cell::new("Matched").add_attribute(Attribute::Bold),
        Cell::new(summary.matched)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Unmatched left"), count_cell(summary.unmatched_left)]);
    table.add_row(vec![Cell::new("Unmatched right"), count_cell(summary.unmatched_right)]);
    table.add_row(vec![Cell::new("Output rows"), Cell::new(outcome.result.output.len())]);
    table.add_row(vec![
        Cell::new("Elapsed"),
        dim_cell(format!("{:.2?}", outcome.elapsed)),
    ]);
    table
}

fn scanned_cell(scanned: usize, total: usize) -> Cell {
    if scanned < total {
        Cell::new(scanned)
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(scanned)
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow)
    } else {
        dim_cell(count)
    }
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
