//! Serializing migrated tables to disk.
//!
//! Three layouts are supported: one `<table>.json` array per table, a single
//! combined object mirroring the dump's file name, or one keyed object per
//! table written through [`JsonStore`] so the API can load it directly.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};

use crate::{
    store::JsonStore,
    tables::{Table, TableSet},
};

const PRETTY_INDENT: &[u8] = b"    ";
const ID_FIELD: &str = "id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonStyle {
    #[default]
    Compact,
    Pretty,
}

impl JsonStyle {
    pub fn from_flag(pretty: bool) -> Self {
        if pretty {
            JsonStyle::Pretty
        } else {
            JsonStyle::Compact
        }
    }
}

pub fn to_json_string<T: Serialize + ?Sized>(value: &T, style: JsonStyle) -> Result<String> {
    match style {
        JsonStyle::Compact => serde_json::to_string(value).context("Serializing JSON"),
        JsonStyle::Pretty => {
            let mut buffer = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(
                &mut buffer,
                PrettyFormatter::with_indent(PRETTY_INDENT),
            );
            value
                .serialize(&mut serializer)
                .context("Serializing JSON")?;
            String::from_utf8(buffer).context("Serialized JSON is not UTF-8")
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `<dir>/<table>.json` for the given table name.
pub fn table_file_path(dir: &Path, table: &str) -> Result<PathBuf> {
    let unsafe_name = table.is_empty()
        || table == "."
        || table == ".."
        || table.contains(['/', '\\', '\0']);
    if unsafe_name {
        bail!("Table name '{table}' cannot be used as a file name");
    }
    Ok(dir.join(format!("{table}.json")))
}

/// The dump path with its extension swapped for `.json`.
pub fn combined_output_path(input: &Path) -> Result<PathBuf> {
    let output = input.with_extension("json");
    if output == input {
        bail!("Combined output would overwrite the input file {input:?}");
    }
    Ok(output)
}

/// Writes each table as a JSON array, returning the written paths in table order.
pub fn write_table_files(tables: &TableSet, dir: &Path, style: JsonStyle) -> Result<Vec<PathBuf>> {
    tables
        .iter()
        .map(|table| {
            let path = table_file_path(dir, &table.name)?;
            let serialized = to_json_string(&table.rows, style)?;
            std::fs::write(&path, serialized)
                .with_context(|| format!("Writing table '{}' to {path:?}", table.name))?;
            Ok(path)
        })
        .collect()
}

pub fn write_combined(tables: &TableSet, path: &Path, style: JsonStyle) -> Result<PathBuf> {
    let serialized = to_json_string(tables, style)?;
    std::fs::write(path, serialized).with_context(|| format!("Writing combined output {path:?}"))?;
    Ok(path.to_path_buf())
}

/// Writes each table as an object keyed by row id through the flat-file store.
pub fn write_keyed(tables: &TableSet, dir: &Path, style: JsonStyle) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = table_file_path(dir, &table.name)?;
        let keyed = keyed_rows(table)?;
        let store = JsonStore::open(&path)?.with_style(style);
        store.set_all(Value::Object(keyed))?;
        written.push(store.path().to_path_buf());
    }
    Ok(written)
}

/// Re-shapes a table into `{ "<id>": row, ... }`.
pub fn keyed_rows(table: &Table) -> Result<Map<String, Value>> {
    let mut keyed = Map::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let key = match row.get(ID_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => bail!(
                "Row {idx} of '{}' has {} as its id",
                table.name,
                json_kind(other)
            ),
            None => {
                return Err(anyhow!(
                    "Row {idx} of '{}' has no '{ID_FIELD}' field to key by",
                    table.name
                ));
            }
        };
        if keyed.insert(key.clone(), Value::Object(row.clone())).is_some() {
            bail!("Duplicate id {key} in table '{}'", table.name);
        }
    }
    Ok(keyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn table(name: &str, rows: Value) -> Table {
        Table {
            name: name.to_string(),
            rows: rows
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r.as_object().unwrap().clone())
                .collect(),
        }
    }

    #[test]
    fn pretty_output_uses_four_space_indent() {
        let rendered = to_json_string(&json!({"a": [1]}), JsonStyle::Pretty).unwrap();
        assert_eq!(rendered, "{\n    \"a\": [\n        1\n    ]\n}");
        let compact = to_json_string(&json!({"a": [1]}), JsonStyle::Compact).unwrap();
        assert_eq!(compact, r#"{"a":[1]}"#);
    }

    #[test]
    fn table_file_path_rejects_traversal() {
        let dir = Path::new("out");
        assert_eq!(
            table_file_path(dir, "lockers").unwrap(),
            PathBuf::from("out/lockers.json")
        );
        assert!(table_file_path(dir, "../etc").is_err());
        assert!(table_file_path(dir, "..").is_err());
        assert!(table_file_path(dir, "").is_err());
    }

    #[test]
    fn combined_path_swaps_extension() {
        assert_eq!(
            combined_output_path(Path::new("dumps/lockers.sql")).unwrap(),
            PathBuf::from("dumps/lockers.json")
        );
        assert!(combined_output_path(Path::new("dump.json")).is_err());
    }

    #[test]
    fn keyed_rows_use_id_field() {
        let keyed = keyed_rows(&table("t", json!([{"id": 2, "x": 1}, {"id": "a"}]))).unwrap();
        assert_eq!(keyed.keys().collect::<Vec<_>>(), vec!["2", "a"]);
        assert!(keyed_rows(&table("t", json!([{"x": 1}]))).is_err());
        assert!(keyed_rows(&table("t", json!([{"id": 1}, {"id": 1}]))).is_err());
        assert!(keyed_rows(&table("t", json!([{"id": null}]))).is_err());
    }

    #[test]
    fn writes_one_file_per_table() {
        let dir = tempdir().expect("temp dir");
        let mut tables = TableSet::new();
        tables.append("a", table("a", json!([{"id": 1}])).rows);
        tables.append("b", Vec::new());
        let written = write_table_files(&tables, dir.path(), JsonStyle::Compact).unwrap();
        assert_eq!(written, vec![dir.path().join("a.json"), dir.path().join("b.json")]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.json")).unwrap(),
            r#"[{"id":1}]"#
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("b.json")).unwrap(), "[]");
    }
}
