use itertools::Itertools;
use log::debug;

use crate::{
    error::MigrationError,
    tables::{Row, TableSet},
};

use super::{
    extract::{ExtractedStatement, INSERT_MARKER},
    literal::Literal,
    tuples::{split_literals, split_tuples},
};

const VALUES_KEYWORD: &str = "VALUES";

/// Table name, column list and raw VALUES clause of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertHeader<'a> {
    pub table: String,
    pub columns: Vec<String>,
    pub values: &'a str,
}

/// Interprets one statement and appends its rows to `tables`.
///
/// Returns the number of rows appended. Row indices in errors count from the
/// start of the table, across every statement seen so far.
pub fn interpret(
    statement: &ExtractedStatement<'_>,
    tables: &mut TableSet,
) -> Result<usize, MigrationError> {
    let header = parse_header(statement)?;
    let first_row = tables.rows(&header.table).map_or(0, <[Row]>::len);
    let rows = build_rows(statement, &header, first_row)?;
    let count = rows.len();
    debug!(
        "Statement at offset {} adds {} row(s) to '{}'",
        statement.offset, count, header.table
    );
    tables.append(&header.table, rows);
    Ok(count)
}

pub fn parse_header<'a>(
    statement: &ExtractedStatement<'a>,
) -> Result<InsertHeader<'a>, MigrationError> {
    let malformed = |reason: &str| MigrationError::malformed_statement(statement.offset, reason);

    let rest = statement
        .text
        .strip_prefix(INSERT_MARKER)
        .ok_or_else(|| malformed("statement does not start with INSERT INTO"))?
        .trim_start();

    let (table, rest) = split_table_name(rest).ok_or_else(|| malformed("missing table name"))?;

    let rest = rest.trim_start();
    let column_list = rest
        .strip_prefix('(')
        .ok_or_else(|| malformed("missing column list"))?;
    let close = column_list
        .find(')')
        .ok_or_else(|| malformed("unterminated column list"))?;
    let columns = column_list[..close]
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_string())
        .collect::<Vec<_>>();
    if columns.iter().any(String::is_empty) {
        return Err(malformed("empty column name"));
    }
    if let Some(duplicate) = columns.iter().duplicates().next() {
        return Err(malformed(&format!("duplicate column '{duplicate}'")));
    }

    let after_columns = column_list[close + 1..].trim_start();
    let keyword = after_columns
        .get(..VALUES_KEYWORD.len())
        .filter(|k| k.eq_ignore_ascii_case(VALUES_KEYWORD))
        .ok_or_else(|| malformed("missing VALUES keyword"))?;
    let values = after_columns[keyword.len()..].trim_end();
    let values = values.strip_suffix(';').unwrap_or(values);

    Ok(InsertHeader {
        table,
        columns,
        values,
    })
}

/// Reads a possibly double-quoted identifier, returning it and the remainder.
fn split_table_name(input: &str) -> Option<(String, &str)> {
    let (raw, rest) = if let Some(quoted) = input.strip_prefix('"') {
        let end = quoted.find('"')?;
        (&quoted[..end], &quoted[end + 1..])
    } else {
        let end = input
            .find(|c: char| c.is_whitespace() || c == '(')
            .unwrap_or(input.len());
        (&input[..end], &input[end..])
    };
    let name = raw.trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some((name.to_string(), rest))
    }
}

fn build_rows(
    statement: &ExtractedStatement<'_>,
    header: &InsertHeader<'_>,
    first_row: usize,
) -> Result<Vec<Row>, MigrationError> {
    let tuples = split_tuples(header.values)
        .map_err(|err| MigrationError::malformed_statement(statement.offset, err.to_string()))?;
    if tuples.is_empty() {
        return Err(MigrationError::malformed_statement(
            statement.offset,
            "VALUES clause contains no tuples",
        ));
    }

    let mut rows = Vec::with_capacity(tuples.len());
    for (idx, tuple) in tuples.into_iter().enumerate() {
        let row_index = first_row + idx;
        let fields = split_literals(tuple);
        if fields.len() != header.columns.len() {
            return Err(MigrationError::ArityMismatch {
                table: header.table.clone(),
                row: row_index,
                expected: header.columns.len(),
                found: fields.len(),
            });
        }

        let mut row = Row::new();
        for (column, raw) in header.columns.iter().zip(fields) {
            let literal = Literal::evaluate(raw).map_err(|err| MigrationError::MalformedLiteral {
                table: header.table.clone(),
                row: row_index,
                column: column.clone(),
                token: err.token,
            })?;
            row.insert(column.clone(), literal.into_json());
        }
        rows.push(row);
    }
    Ok(rows)
}
