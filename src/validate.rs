//! Structural checks for migrated locker records.
//!
//! The locker API rejects records that do not match its schema, so a migrated
//! `lockers.json` can be checked up front. Each validator stops at the first
//! offending field and reports it with a dotted path such as `user.email`.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::output::json_kind;

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {problem}")]
pub struct ValidationIssue {
    pub field: String,
    pub problem: Problem,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    #[error("field is missing")]
    Missing,
    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("id must be a positive number")]
    InvalidId,
    #[error("'{0}' is not a valid date")]
    InvalidDate(String),
    #[error("record must be an object, found {0}")]
    NotAnObject(&'static str),
}

impl ValidationIssue {
    fn new(field: &str, problem: Problem) -> Self {
        Self {
            field: field.to_string(),
            problem,
        }
    }

    fn nested(self, parent: &str) -> Self {
        let field = if self.field.is_empty() {
            parent.to_string()
        } else {
            format!("{parent}.{}", self.field)
        };
        Self { field, ..self }
    }
}

/// A failing record from [`validate_lockers`], labelled by its key or index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    pub record: String,
    pub issue: ValidationIssue,
}

pub fn validate_locker(locker: &Value) -> Result<(), ValidationIssue> {
    let record = as_record(locker)?;
    require_id(record)?;
    let user = require_present(record, "user")?;
    validate_user(user).map_err(|issue| issue.nested("user"))?;
    let renter = require_present(record, "renter")?;
    validate_renter(renter).map_err(|issue| issue.nested("renter"))?;
    require_date(record, "expirationDate")?;
    require_bool(record, "broken")?;
    require_string(record, "note")?;
    match record.get("sepa") {
        None | Some(Value::Null) => {}
        Some(sepa) => validate_sepa(sepa).map_err(|issue| issue.nested("sepa"))?,
    }
    Ok(())
}

pub fn validate_user(user: &Value) -> Result<(), ValidationIssue> {
    let record = as_record(user)?;
    require_id(record)?;
    for field in ["firstName", "lastName", "class", "phone", "mobile", "email"] {
        require_string(record, field)?;
    }
    Ok(())
}

pub fn validate_renter(renter: &Value) -> Result<(), ValidationIssue> {
    let record = as_record(renter)?;
    require_id(record)?;
    for field in ["firstName", "lastName", "phone", "mobile", "email"] {
        require_string(record, field)?;
    }
    Ok(())
}

pub fn validate_sepa(sepa: &Value) -> Result<(), ValidationIssue> {
    let record = as_record(sepa)?;
    for field in ["child", "name", "bank", "iban", "bic"] {
        require_string(record, field)?;
    }
    require_date(record, "appliesFrom")
}

/// Accepts RFC 3339 timestamps, plain dates, and naive date-times with a space
/// or `T` separator and optional fractional seconds.
pub fn validate_date(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || NAIVE_DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
}

/// Validates every locker in an array or an id-keyed object, collecting the
/// records that fail.
pub fn validate_lockers(document: &Value) -> Result<Vec<RecordIssue>> {
    let records: Vec<(String, &Value)> = match document {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| (record_label(idx, item), item))
            .collect(),
        Value::Object(map) => map.iter().map(|(key, item)| (key.clone(), item)).collect(),
        other => bail!(
            "Expected an array or object of lockers, found {}",
            json_kind(other)
        ),
    };
    Ok(records
        .into_iter()
        .filter_map(|(record, item)| {
            validate_locker(item)
                .err()
                .map(|issue| RecordIssue { record, issue })
        })
        .collect())
}

fn record_label(idx: usize, item: &Value) -> String {
    match item.get("id") {
        Some(id @ (Value::Number(_) | Value::String(_))) => format!("[{idx}] (id {id})"),
        _ => format!("[{idx}]"),
    }
}

fn as_record(value: &Value) -> Result<&Map<String, Value>, ValidationIssue> {
    value
        .as_object()
        .ok_or_else(|| ValidationIssue::new("", Problem::NotAnObject(json_kind(value))))
}

fn require_present<'a>(
    record: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Value, ValidationIssue> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ValidationIssue::new(field, Problem::Missing)),
        Some(value) => Ok(value),
    }
}

fn require_id(record: &Map<String, Value>) -> Result<(), ValidationIssue> {
    let id = require_present(record, "id")?;
    match id.as_f64() {
        Some(n) if n > 0.0 => Ok(()),
        Some(_) => Err(ValidationIssue::new("id", Problem::InvalidId)),
        None => Err(wrong_type("id", "a number", id)),
    }
}

fn require_string<'a>(
    record: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ValidationIssue> {
    match record.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(wrong_type(field, "a string", other)),
        None => Err(ValidationIssue::new(field, Problem::Missing)),
    }
}

fn require_bool(record: &Map<String, Value>, field: &str) -> Result<(), ValidationIssue> {
    match record.get(field) {
        Some(Value::Bool(_)) => Ok(()),
        Some(other) => Err(wrong_type(field, "a boolean", other)),
        None => Err(ValidationIssue::new(field, Problem::Missing)),
    }
}

fn require_date(record: &Map<String, Value>, field: &str) -> Result<(), ValidationIssue> {
    let text = require_string(record, field)?;
    if validate_date(text) {
        Ok(())
    } else {
        Err(ValidationIssue::new(
            field,
            Problem::InvalidDate(text.to_string()),
        ))
    }
}

fn wrong_type(field: &str, expected: &'static str, found: &Value) -> ValidationIssue {
    ValidationIssue::new(
        field,
        Problem::WrongType {
            expected,
            found: json_kind(found),
        },
    )
}
