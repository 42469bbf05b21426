use std::path::PathBuf;

/// Fatal failures raised while turning a dump into tables.
///
/// Recoverable problems (unresolved references, missing tables) are not
/// errors; they are reported through [`crate::diagnostics::Diagnostic`].
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Malformed literal {token:?} in table '{table}', row {row}, column '{column}'")]
    MalformedLiteral {
        table: String,
        row: usize,
        column: String,
        token: String,
    },

    #[error("Malformed INSERT statement at byte offset {offset}: {reason}")]
    MalformedStatement { offset: usize, reason: String },

    #[error("Row {row} of table '{table}' has {found} value(s) but {expected} column(s)")]
    ArityMismatch {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Failed to read dump file {path:?}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid migration plan: {0}")]
    Plan(String),

    #[error("Renaming fields of table '{table}', row {row} would overwrite field '{field}'")]
    FieldCollision {
        table: String,
        row: usize,
        field: String,
    },
}

impl MigrationError {
    pub(crate) fn malformed_statement(offset: usize, reason: impl Into<String>) -> Self {
        MigrationError::MalformedStatement {
            offset,
            reason: reason.into(),
        }
    }
}
