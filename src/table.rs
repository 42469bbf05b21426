//! Plain-text table rendering for `inspect`.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::tables::TableSet;

const COLUMN_GAP: &str = "  ";
const MAX_COLUMN_LIST: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Renders a header line, a dashed separator, and one line per row. Cells
/// beyond the header count are dropped; trailing padding is trimmed.
pub fn render_table(headers: &[&str], align: &[Align], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| cell_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell_width(cell));
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths, align));
    let separator = widths.iter().map(|w| "-".repeat(*w)).join(COLUMN_GAP);
    let _ = writeln!(output, "{separator}");
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, align));
    }
    output
}

/// One line per table: name, row count, and the column names seen in its rows.
pub fn render_summary(tables: &TableSet) -> String {
    let rows = tables
        .iter()
        .map(|table| {
            vec![
                table.name.clone(),
                table.rows.len().to_string(),
                abbreviate(&table.columns().iter().join(", ")),
            ]
        })
        .collect::<Vec<_>>();
    let mut output = render_table(
        &["table", "rows", "columns"],
        &[Align::Left, Align::Right, Align::Left],
        &rows,
    );
    let _ = writeln!(
        output,
        "{} table(s), {} row(s)",
        tables.len(),
        tables.total_rows()
    );
    output
}

fn format_row(cells: &[String], widths: &[usize], align: &[Align]) -> String {
    let line = cells
        .iter()
        .zip(widths.iter().copied())
        .enumerate()
        .map(|(idx, (cell, width))| {
            let cell = flatten(cell);
            match align.get(idx).copied().unwrap_or(Align::Left) {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            }
        })
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

fn cell_width(value: &str) -> usize {
    value.chars().count()
}

fn flatten(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}

fn abbreviate(value: &str) -> String {
    if cell_width(value) <= MAX_COLUMN_LIST {
        return value.to_string();
    }
    let mut shortened = value.chars().take(MAX_COLUMN_LIST - 3).collect::<String>();
    shortened.push_str("...");
    shortened
}
