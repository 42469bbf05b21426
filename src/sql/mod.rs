//! Hand-rolled scanners for the `INSERT INTO ... VALUES ...;` statements found
//! in legacy dumps.
//!
//! The pipeline is deliberately narrow: statements are located with
//! [`extract::StatementExtractor`], their VALUES clause is cut into tuples by
//! [`tuples::split_tuples`], each tuple into raw literals by
//! [`tuples::split_literals`], and every literal is evaluated through the closed
//! grammar in [`literal`]. [`statement::interpret`] ties those steps together
//! and appends the resulting rows to a [`crate::tables::TableSet`].
//!
//! Every scanner shares the same quoting rule: a `'` toggles string mode, and
//! inside a string a backslash protects the character that follows it.

pub mod extract;
pub mod literal;
pub mod statement;
pub mod tuples;

pub use extract::{ExtractedStatement, INSERT_MARKER, StatementExtractor};
pub use literal::{Literal, LiteralError};
pub use statement::interpret;
pub use tuples::{SplitError, split_literals, split_tuples};
