//! Flat-file key/value store used by the locker API.
//!
//! The whole store is one JSON document on disk: either an object keyed by
//! name, or an array of rows addressed by index (`"0"`, `"1"`, ...). Every
//! operation reads the file, changes the document, and writes it back; there
//! is no locking, so concurrent writers can lose updates.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Map, Value};

use crate::output::{self, JsonStyle};

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    style: JsonStyle,
}

/// In-memory form of the store file.
#[derive(Debug)]
enum Document {
    Keyed(Map<String, Value>),
    Rows(Vec<Value>),
}

impl Document {
    fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Object(map) => Ok(Document::Keyed(map)),
            Value::Array(rows) => Ok(Document::Rows(rows)),
            other => Err(output::json_kind(&other)),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Document::Keyed(map) => Value::Object(map),
            Document::Rows(rows) => Value::Array(rows),
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Document::Keyed(map) => map.get(key),
            Document::Rows(rows) => row_index(key).and_then(|idx| rows.get(idx)),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        match self {
            Document::Keyed(map) => {
                map.insert(key.to_string(), value);
            }
            Document::Rows(rows) => {
                let idx = row_index(key)
                    .ok_or_else(|| anyhow!("Key '{key}' is not a row index of an array store"))?;
                if idx >= rows.len() {
                    rows.resize(idx + 1, Value::Null);
                }
                rows[idx] = value;
            }
        }
        Ok(())
    }

    /// Array rows are nulled rather than removed so later indices stay stable.
    fn remove(&mut self, key: &str) -> bool {
        match self {
            Document::Keyed(map) => map.shift_remove(key).is_some(),
            Document::Rows(rows) => match row_index(key).and_then(|idx| rows.get_mut(idx)) {
                Some(slot) if !slot.is_null() => {
                    *slot = Value::Null;
                    true
                }
                _ => false,
            },
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            Document::Keyed(map) => map.keys().cloned().collect(),
            Document::Rows(rows) => (0..rows.len()).map(|idx| idx.to_string()).collect(),
        }
    }

    fn cleared(&self) -> Self {
        match self {
            Document::Keyed(_) => Document::Keyed(Map::new()),
            Document::Rows(_) => Document::Rows(Vec::new()),
        }
    }
}

/// Canonical decimal index only: `"01"` or `"+1"` address nothing.
fn row_index(key: &str) -> Option<usize> {
    let idx = key.parse::<usize>().ok()?;
    (idx.to_string() == key).then_some(idx)
}

impl JsonStore {
    /// Opens the keyed store at `path`, creating it with `{}` when it does not
    /// exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path, Value::Object(Map::new()))
    }

    /// Opens the store at `path`, creating it with `initial` when it does not
    /// exist. An existing file keeps its content and shape.
    pub fn open_with(path: impl Into<PathBuf>, initial: Value) -> Result<Self> {
        let store = Self {
            path: path.into(),
            style: JsonStyle::Compact,
        };
        if !store.path.exists() {
            let document = Document::from_value(initial).map_err(|kind| {
                anyhow!(
                    "Initial value of store {:?} must be an object or array, found {kind}",
                    store.path
                )
            })?;
            store.write(document)?;
        }
        Ok(store)
    }

    pub fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the value under `key`; `null` values read as absent.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read()?.get(key).filter(|v| !v.is_null()).cloned())
    }

    /// Sets `key`. Array stores take a row index and pad skipped rows with
    /// `null`.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut document = self.read()?;
        document.set(key, value)?;
        self.write(document)
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.delete_many(&[key]).map(|removed| removed == 1)
    }

    pub fn delete_many<S: AsRef<str>>(&self, keys: &[S]) -> Result<usize> {
        let mut document = self.read()?;
        let removed = keys
            .iter()
            .filter(|key| document.remove(key.as_ref()))
            .count();
        self.write(document)?;
        Ok(removed)
    }

    /// Keys in file order, optionally restricted to those starting with `prefix`.
    pub fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let mut keys = self.read()?.keys();
        if let Some(prefix) = prefix {
            keys.retain(|key| key.starts_with(prefix));
        }
        Ok(keys)
    }

    pub fn get_all(&self) -> Result<Value> {
        Ok(self.read()?.into_value())
    }

    pub fn set_all(&self, data: Value) -> Result<()> {
        match Document::from_value(data) {
            Ok(document) => self.write(document),
            Err(kind) => bail!(
                "Store {:?} can only hold an object or array, found {kind}",
                self.path
            ),
        }
    }

    /// Clears the store, keeping its object or array shape.
    pub fn empty(&self) -> Result<()> {
        let cleared = self.read()?.cleared();
        self.write(cleared)
    }

    fn read(&self) -> Result<Document> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Reading store {:?}", self.path))?;
        let value = serde_json::from_str::<Value>(&raw)
            .with_context(|| format!("Parsing store {:?}", self.path))?;
        Document::from_value(value).map_err(|kind| {
            anyhow!(
                "Store {:?} must hold a JSON object or array, found {kind}",
                self.path
            )
        })
    }

    fn write(&self, document: Document) -> Result<()> {
        let serialized = output::to_json_string(&document.into_value(), self.style)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Writing store {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn open_creates_empty_object() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("users.json");
        let store = JsonStore::open(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(store.list(None).unwrap().is_empty());
    }

    #[test]
    fn open_with_seeds_initial_array() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("lockers.json");
        JsonStore::open_with(&path, json!([])).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(JsonStore::open_with(dir.path().join("x.json"), json!(3)).is_err());
    }

    #[test]
    fn open_keeps_existing_content() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("users.json");
        fs::write(&path, r#"{"admin":{"password":"x"}}"#).unwrap();
        let store = JsonStore::open_with(&path, json!([])).unwrap();
        assert_eq!(store.get("admin").unwrap(), Some(json!({"password": "x"})));
    }

    #[test]
    fn set_get_delete_cycle() {
        let dir = tempdir().expect("temp dir");
        let store = JsonStore::open(dir.path().join("s.json")).unwrap();
        store.set("1", json!({"id": 1})).unwrap();
        store.set("2", json!({"id": 2})).unwrap();
        store.set("nothing", Value::Null).unwrap();

        assert_eq!(store.get("1").unwrap(), Some(json!({"id": 1})));
        assert_eq!(store.get("nothing").unwrap(), None);
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(store.delete("1").unwrap());
        assert!(!store.delete("1").unwrap());
        assert_eq!(store.list(None).unwrap(), vec!["2", "nothing"]);
    }

    #[test]
    fn array_store_is_addressed_by_index() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("lockers.json");
        fs::write(&path, r#"[{"id":1},{"id":2}]"#).unwrap();
        let store = JsonStore::open(&path).unwrap();

        assert_eq!(store.list(None).unwrap(), vec!["0", "1"]);
        assert_eq!(store.get("1").unwrap(), Some(json!({"id": 2})));
        assert_eq!(store.get("01").unwrap(), None);
        assert_eq!(store.get("id").unwrap(), None);

        store.set("3", json!({"id": 4})).unwrap();
        assert_eq!(
            store.get_all().unwrap(),
            json!([{"id": 1}, {"id": 2}, null, {"id": 4}])
        );
        assert!(store.set("first", json!(1)).is_err());

        assert_eq!(store.delete_many(&["0", "2", "9"]).unwrap(), 1);
        assert_eq!(store.get("0").unwrap(), None);
        assert_eq!(store.get("1").unwrap(), Some(json!({"id": 2})));

        store.empty().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn list_filters_by_prefix_and_delete_many_counts() {
        let dir = tempdir().expect("temp dir");
        let store = JsonStore::open(dir.path().join("s.json")).unwrap();
        store
            .set_all(json!({"locker:1": true, "locker:2": true, "user:1": true}))
            .unwrap();

        assert_eq!(
            store.list(Some("locker:")).unwrap(),
            vec!["locker:1", "locker:2"]
        );
        assert_eq!(store.delete_many(&["locker:1", "user:1", "nope"]).unwrap(), 2);
        assert_eq!(store.get_all().unwrap(), json!({"locker:2": true}));
        store.empty().unwrap();
        assert_eq!(store.get_all().unwrap(), json!({}));
    }

    #[test]
    fn rejects_scalar_files() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("lockers.json");
        fs::write(&path, "42").unwrap();
        let store = JsonStore::open(&path).unwrap();
        let err = store.get_all().unwrap_err();
        assert!(err.to_string().contains("must hold a JSON object or array"));
        assert!(store.set_all(json!("text")).is_err());
    }
}
