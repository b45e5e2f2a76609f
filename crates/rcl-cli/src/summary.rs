use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rcl_formula::FUNCTIONS;
use rcl_report::DatasetStatus;

use crate::pipeline::{ColumnDependencies, SolvedRow};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// One line per solved value.
pub fn solved_table(rows: &[SolvedRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Value"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for row in rows {
        let id = row.id.as_ref().map(ToString::to_string).unwrap_or_default();
        if row.values.is_empty() {
            table.add_row(vec![Cell::new(&id), dim_cell("-"), dim_cell("nothing solved")]);
        }
        for (column, value) in &row.values {
            table.add_row(vec![Cell::new(&id), Cell::new(column), Cell::new(value)]);
        }
    }
    table
}

pub fn dependency_table(counts: &[ColumnDependencies]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Dependencies"),
        header_cell("Formula"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in counts {
        table.add_row(vec![
            Cell::new(&entry.column),
            count_cell(entry.dependencies),
            Cell::new(&entry.formula),
        ]);
    }
    table
}

/// The function registry in solving order.
pub fn functions_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Function"),
        header_cell("Operands"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for spec in FUNCTIONS {
        table.add_row(vec![
            Cell::new(spec.name).add_attribute(Attribute::Bold),
            Cell::new(spec.arity),
            Cell::new(spec.summary),
        ]);
    }
    table
}

pub fn statuses_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Status"),
        header_cell("Editable"),
        header_cell("Send"),
        header_cell("Submit"),
        header_cell("Refresh"),
        header_cell("Final"),
    ]);
    apply_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Center);
    }
    for status in DatasetStatus::ALL {
        table.add_row(vec![
            Cell::new(status.as_str()),
            flag_cell(status.is_editable()),
            flag_cell(status.can_be_sent()),
            flag_cell(status.can_be_submitted()),
            flag_cell(status.can_be_refreshed()),
            flag_cell(status.is_finalized()),
        ]);
    }
    table
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

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("yes").fg(Color::Green)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
