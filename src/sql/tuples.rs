/// Reasons a VALUES clause cannot be cut into tuples.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("unexpected {character:?} outside of a value tuple at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("nested parenthesis inside a value tuple at position {position}")]
    NestedParenthesis { position: usize },
    #[error("value tuple opened at position {position} is never closed")]
    UnterminatedTuple { position: usize },
    #[error("string literal opened at position {position} is never closed")]
    UnterminatedString { position: usize },
}

/// Splits a VALUES clause such as `(1,'a'), (2,'b')` into raw tuple bodies.
///
/// Bodies are returned without their parentheses and with any whitespace
/// inside the tuple preserved. Whitespace between tuples is skipped, as is a
/// single `,` following a closed tuple.
pub fn split_tuples(values: &str) -> Result<Vec<&str>, SplitError> {
    let mut tuples = Vec::new();
    let mut open: Option<usize> = None;
    let mut string_start: Option<usize> = None;
    let mut escaped = false;
    let mut after_tuple = false;

    for (idx, ch) in values.char_indices() {
        if string_start.is_some() {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '\'' {
                string_start = None;
            }
            continue;
        }

        match open {
            Some(body_start) => match ch {
                '\'' => string_start = Some(idx),
                ')' => {
                    tuples.push(&values[body_start..idx]);
                    open = None;
                    after_tuple = true;
                }
                '(' => return Err(SplitError::NestedParenthesis { position: idx }),
                _ => {}
            },
            None => match ch {
                '(' => {
                    open = Some(idx + 1);
                    after_tuple = false;
                }
                ',' if after_tuple => after_tuple = false,
                c if c.is_whitespace() => {}
                other => {
                    return Err(SplitError::UnexpectedCharacter {
                        character: other,
                        position: idx,
                    });
                }
            },
        }
    }

    if let Some(position) = string_start {
        return Err(SplitError::UnterminatedString { position });
    }
    if let Some(body_start) = open {
        return Err(SplitError::UnterminatedTuple {
            position: body_start - 1,
        });
    }
    Ok(tuples)
}

/// Splits one tuple body such as `1, 'a,b', NULL` on commas outside strings.
///
/// Tokens are returned verbatim: string tokens keep their quotes and
/// surrounding spaces are left for the literal evaluator to trim.
pub fn split_literals(tuple: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut field_start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in tuple.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '\'' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '\'' => in_string = true,
            ',' => {
                fields.push(&tuple[field_start..idx]);
                field_start = idx + 1;
            }
            _ => {}
        }
    }
    fields.push(&tuple[field_start..]);
    fields
}
