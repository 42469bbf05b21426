//! Closed grammar for the scalar literals that appear in dump tuples.
//!
//! Only quoted strings, integers, floats, booleans and `NULL` are accepted.
//! Anything else is rejected with [`LiteralError`]; bare tokens are never
//! evaluated as expressions.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{token:?} is not a string, number, boolean or NULL literal")]
pub struct LiteralError {
    pub token: String,
}

fn integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[+-]?[0-9]+$").expect("integer pattern compiles"))
}

fn float_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)([eE][+-]?[0-9]+)?$")
            .expect("float pattern compiles")
    })
}

impl Literal {
    /// Evaluates one raw token as produced by [`super::split_literals`].
    ///
    /// Surrounding whitespace is ignored. String content is returned exactly
    /// as written between the quotes.
    pub fn evaluate(raw: &str) -> Result<Literal, LiteralError> {
        let token = raw.trim();
        let malformed = || LiteralError {
            token: raw.to_string(),
        };

        if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
            return Ok(Literal::String(token[1..token.len() - 1].to_string()));
        }
        if token.eq_ignore_ascii_case("null") {
            return Ok(Literal::Null);
        }
        if token.eq_ignore_ascii_case("true") {
            return Ok(Literal::Boolean(true));
        }
        if token.eq_ignore_ascii_case("false") {
            return Ok(Literal::Boolean(false));
        }
        if integer_pattern().is_match(token) {
            if let Ok(value) = token.parse::<i64>() {
                return Ok(Literal::Integer(value));
            }
        }
        if float_pattern().is_match(token) {
            return match token.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Literal::Float(value)),
                _ => Err(malformed()),
            };
        }
        Err(malformed())
    }

    pub fn into_json(self) -> Value {
        match self {
            Literal::String(s) => Value::String(s),
            Literal::Integer(i) => Value::Number(i.into()),
            // evaluate() only produces finite floats
            Literal::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            Literal::Boolean(b) => Value::Bool(b),
            Literal::Null => Value::Null,
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        literal.into_json()
    }
}
