//! End-to-end migration: dump text in, reshaped tables plus diagnostics out.

use log::{debug, info};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    error::MigrationError,
    plan::MigrationPlan,
    remap,
    resolve,
    sql::{self, StatementExtractor},
    tables::TableSet,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub tables: TableSet,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extracts and interprets every INSERT statement of `dump`.
///
/// Fails on the first malformed statement or literal; a half-migrated dump is
/// never returned.
pub fn parse_dump(dump: &str) -> Result<TableSet, MigrationError> {
    let mut tables = TableSet::new();
    let mut statements = 0usize;
    for statement in StatementExtractor::new(dump) {
        sql::interpret(&statement, &mut tables)?;
        statements += 1;
    }
    debug!(
        "Parsed {statements} INSERT statement(s) into {} table(s)",
        tables.len()
    );
    Ok(tables)
}

pub fn migrate(dump: &str, plan: &MigrationPlan) -> Result<Migration, MigrationError> {
    plan.validate()?;
    let mut tables = parse_dump(dump)?;
    info!(
        "Parsed {} row(s) across {} table(s)",
        tables.total_rows(),
        tables.len()
    );

    remap::apply_renames(&mut tables, &plan.renames)?;
    remap::apply_key_style(&mut tables, plan.key_style)?;

    let mut diagnostics = Diagnostics::new();
    resolve::resolve_references(&mut tables, &plan.links, &mut diagnostics);

    Ok(Migration {
        tables,
        diagnostics: diagnostics.into_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_dump_accumulates_statements_in_order() {
        let dump = "INSERT INTO \"t\" (a) VALUES (1),(2);\nINSERT INTO \"u\" (b) VALUES ('x');\nINSERT INTO \"t\" (a) VALUES (3);\n";
        let tables = parse_dump(dump).unwrap();
        assert_eq!(
            serde_json::to_value(&tables).unwrap(),
            json!({"t": [{"a": 1}, {"a": 2}, {"a": 3}], "u": [{"b": "x"}]})
        );
    }

    #[test]
    fn migrate_rejects_invalid_plan_before_parsing() {
        let mut plan = MigrationPlan::empty();
        plan.links
            .push(crate::plan::ReferenceLink::new("t", "a", "t"));
        assert!(matches!(
            migrate("not even sql", &plan),
            Err(MigrationError::Plan(_))
        ));
    }

    #[test]
    fn empty_plan_keeps_tables_as_parsed() {
        let migration = migrate(
            "INSERT INTO \"t\" (user_id) VALUES (1);",
            &MigrationPlan::empty(),
        )
        .unwrap();
        assert!(migration.diagnostics.is_empty());
        assert_eq!(migration.tables.rows("t").unwrap()[0]["user_id"], json!(1));
    }
}
