use std::collections::BTreeMap;

use heck::ToLowerCamelCase;
use itertools::Itertools;
use log::debug;

use crate::{
    error::MigrationError,
    plan::{KeyStyle, RenameMap},
    tables::{Row, TableSet},
};

/// Renames row fields per table. Tables and fields missing from `renames`
/// pass through, so running this twice leaves the data unchanged.
///
/// A rename onto a field that the row already has is a
/// [`MigrationError::FieldCollision`].
pub fn apply_renames(tables: &mut TableSet, renames: &RenameMap) -> Result<(), MigrationError> {
    for (table_name, fields) in renames {
        let Some(table) = tables.get_mut(table_name) else {
            continue;
        };
        let mut renamed = 0usize;
        for (row_idx, row) in table.rows.iter_mut().enumerate() {
            let changed = rename_fields(row, |key| fields.get(key).cloned())
                .map_err(|field| collision(table_name, row_idx, field))?;
            if changed {
                renamed += 1;
            }
        }
        debug!("Renamed fields in {renamed} row(s) of '{table_name}'");
    }
    Ok(())
}

/// Rewrites every field name of every table into `style`. Two fields that
/// style to the same name are a [`MigrationError::FieldCollision`].
pub fn apply_key_style(tables: &mut TableSet, style: KeyStyle) -> Result<(), MigrationError> {
    if style == KeyStyle::Keep {
        return Ok(());
    }
    let mut cache: BTreeMap<String, String> = BTreeMap::new();
    for table in tables.iter_mut() {
        for (row_idx, row) in table.rows.iter_mut().enumerate() {
            rename_fields(row, |key| {
                let styled = cache
                    .entry(key.to_string())
                    .or_insert_with(|| key.to_lower_camel_case());
                (*styled != key).then(|| styled.clone())
            })
            .map_err(|field| collision(&table.name, row_idx, field))?;
        }
    }
    Ok(())
}

fn collision(table: &str, row: usize, field: String) -> MigrationError {
    MigrationError::FieldCollision {
        table: table.to_string(),
        row,
        field,
    }
}

/// Renames fields in place, keeping their position. Returns whether any
/// field changed, or the first name that two fields would end up sharing;
/// the row is left untouched in that case.
fn rename_fields<F>(row: &mut Row, mut new_name: F) -> Result<bool, String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut changed = false;
    let names = row
        .keys()
        .map(|key| match new_name(key.as_str()) {
            Some(name) => {
                changed = true;
                name
            }
            None => key.clone(),
        })
        .collect::<Vec<_>>();
    if !changed {
        return Ok(false);
    }
    if let Some(field) = names.iter().duplicates().next() {
        return Err(field.clone());
    }
    let old = std::mem::take(row);
    row.extend(names.into_iter().zip(old.into_iter().map(|(_, value)| value)));
    Ok(true)
}
