//! Recoverable problems found while migrating, returned alongside the output.

use std::fmt;

use log::warn;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A foreign key matched no row of its dimension table; the field was
    /// set to `null`.
    UnresolvedReference {
        fact_table: String,
        row: usize,
        field: String,
        key: Value,
        dimension_table: String,
    },
    /// A table named by a reference link is absent from the dump.
    MissingTable { table: String, role: TableRole },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    Fact,
    Dimension,
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Fact => f.write_str("fact"),
            TableRole::Dimension => f.write_str("dimension"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedReference {
                fact_table,
                row,
                field,
                key,
                dimension_table,
            } => write!(
                f,
                "{fact_table}[{row}].{field}: no row in '{dimension_table}' has id {key}"
            ),
            Diagnostic::MissingTable { table, role } => {
                write!(f, "{role} table '{table}' not found in dump")
            }
        }
    }
}

/// Collects diagnostics and mirrors each one to the log as a warning.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.records.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.records
    }
}
