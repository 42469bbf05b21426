/// Case-sensitive marker that opens every statement we care about.
pub const INSERT_MARKER: &str = "INSERT INTO";

/// One `INSERT INTO ... ;` statement cut out of a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedStatement<'a> {
    /// Byte offset of the statement within the dump.
    pub offset: usize,
    /// Statement text, including the terminating `;` when one was found.
    pub text: &'a str,
}

/// Lazy, forward-only scan over the INSERT statements of a dump.
///
/// A `;` only terminates a statement outside single-quoted strings. A dump
/// whose last statement lacks a terminator yields that statement up to the end
/// of input.
#[derive(Debug, Clone)]
pub struct StatementExtractor<'a> {
    source: &'a str,
    cursor: usize,
}

impl<'a> StatementExtractor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, cursor: 0 }
    }
}

impl<'a> Iterator for StatementExtractor<'a> {
    type Item = ExtractedStatement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.source.get(self.cursor..)?;
        let Some(relative) = remaining.find(INSERT_MARKER) else {
            self.cursor = self.source.len();
            return None;
        };
        let start = self.cursor + relative;
        let end = statement_end(self.source, start);
        self.cursor = end;
        Some(ExtractedStatement {
            offset: start,
            text: &self.source[start..end],
        })
    }
}

impl std::iter::FusedIterator for StatementExtractor<'_> {}

/// Returns the exclusive end of the statement starting at `start`.
fn statement_end(source: &str, start: usize) -> usize {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in source[start..].char_indices() {
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
            ';' => return start + idx + ch.len_utf8(),
            _ => {}
        }
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        StatementExtractor::new(source).map(|s| s.text).collect()
    }

    #[test]
    fn extracts_each_statement_with_terminator() {
        let dump = "-- header\nINSERT INTO \"a\" (x) VALUES (1);\nSELECT 1;\nINSERT INTO \"b\" (y) VALUES (2);\n";
        assert_eq!(
            texts(dump),
            vec![
                "INSERT INTO \"a\" (x) VALUES (1);",
                "INSERT INTO \"b\" (y) VALUES (2);",
            ]
        );
    }

    #[test]
    fn semicolon_inside_string_does_not_terminate() {
        let dump = "INSERT INTO \"t\" (a) VALUES ('x;y');";
        assert_eq!(texts(dump), vec![dump]);
    }

    #[test]
    fn escaped_quote_keeps_string_open() {
        let dump = r"INSERT INTO t (a) VALUES ('it\'s; fine'); INSERT INTO t (a) VALUES (2);";
        let statements = texts(dump);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], r"INSERT INTO t (a) VALUES ('it\'s; fine');");
    }

    #[test]
    fn unterminated_statement_runs_to_end_of_input() {
        let dump = "INSERT INTO \"t\" (a) VALUES (1)\n";
        let statements: Vec<_> = StatementExtractor::new(dump).collect();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].text, dump);
        assert_eq!(statements[0].offset, 0);
    }

    #[test]
    fn offsets_point_at_marker() {
        let dump = "xx INSERT INTO t (a) VALUES (1); INSERT INTO t (a) VALUES (2);";
        let offsets: Vec<usize> = StatementExtractor::new(dump).map(|s| s.offset).collect();
        assert_eq!(offsets, vec![3, 33]);
    }

    #[test]
    fn marker_is_case_sensitive() {
        assert!(texts("insert into t (a) values (1);").is_empty());
        assert!(texts("").is_empty());
    }

    #[test]
    fn iterator_stays_exhausted() {
        let mut extractor = StatementExtractor::new("INSERT INTO t (a) VALUES (1)");
        assert!(extractor.next().is_some());
        assert!(extractor.next().is_none());
        assert!(extractor.next().is_none());
    }
}
