use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, info};
use serde_json::Value;

use crate::{
    diagnostics::{Diagnostic, Diagnostics, TableRole},
    plan::ReferenceLink,
    tables::{Row, TableSet},
};

/// Inlines dimension rows into fact rows and drops the dimension tables
/// that were consumed by at least one present fact table.
///
/// Each fact row is visited once and every link of its table applied to it in
/// plan order, so warnings come out in row order. A foreign key with no
/// matching dimension row becomes `null` and produces
/// [`Diagnostic::UnresolvedReference`]; a key that is already `null` stays
/// `null` silently.
pub fn resolve_references(
    tables: &mut TableSet,
    links: &[ReferenceLink],
    diagnostics: &mut Diagnostics,
) {
    if links.is_empty() {
        return;
    }

    let mut consumed = Vec::new();
    for fact_name in links.iter().map(|l| l.fact.as_str()).unique() {
        if !tables.contains(fact_name) {
            diagnostics.push(Diagnostic::MissingTable {
                table: fact_name.to_string(),
                role: TableRole::Fact,
            });
            continue;
        }

        let fact_links = links
            .iter()
            .filter(|link| link.fact == fact_name)
            .map(|link| {
                consumed.push(link.dimension.as_str());
                if !tables.contains(&link.dimension) {
                    diagnostics.push(Diagnostic::MissingTable {
                        table: link.dimension.clone(),
                        role: TableRole::Dimension,
                    });
                }
                let index = build_index(tables.rows(&link.dimension).unwrap_or_default(), link);
                (link, index)
            })
            .collect::<Vec<_>>();

        let Some(fact) = tables.get_mut(fact_name) else {
            continue;
        };
        let mut resolved = vec![0usize; fact_links.len()];
        for (row_idx, row) in fact.rows.iter_mut().enumerate() {
            for ((link, index), resolved) in fact_links.iter().zip(resolved.iter_mut()) {
                let key = row.get(&link.foreign_key).cloned().unwrap_or(Value::Null);
                if key.is_null() {
                    row.insert(link.foreign_key.clone(), Value::Null);
                    continue;
                }
                match index.get(&join_key(&key)) {
                    Some(dimension_row) => {
                        row.insert(link.foreign_key.clone(), Value::Object(dimension_row.clone()));
                        *resolved += 1;
                    }
                    None => {
                        row.insert(link.foreign_key.clone(), Value::Null);
                        diagnostics.push(Diagnostic::UnresolvedReference {
                            fact_table: link.fact.clone(),
                            row: row_idx,
                            field: link.foreign_key.clone(),
                            key,
                            dimension_table: link.dimension.clone(),
                        });
                    }
                }
            }
        }
        for ((link, _), resolved) in fact_links.iter().zip(resolved) {
            debug!(
                "Resolved {resolved} of {} '{}.{}' reference(s) against '{}'",
                fact.rows.len(),
                link.fact,
                link.foreign_key,
                link.dimension
            );
        }
    }

    for dimension in consumed.into_iter().unique() {
        if let Some(table) = tables.remove(dimension) {
            info!(
                "Inlined {} row(s) of '{}' and dropped the table",
                table.rows.len(),
                dimension
            );
        }
    }
}

/// Index of dimension rows keyed by [`join_key`] of their id; the first row
/// wins on duplicate ids.
fn build_index(rows: &[Row], link: &ReferenceLink) -> HashMap<String, Row> {
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        if let Some(id) = row.get(&link.dimension_id) {
            index.entry(join_key(id)).or_insert_with(|| row.clone());
        }
    }
    index
}

/// Numbers compare by value (`7` matches `7.0`); everything else by its JSON
/// text, so the string `"7"` never matches the number `7`.
fn join_key(value: &Value) -> String {
    let Value::Number(number) = value else {
        return value.to_string();
    };
    if let Some(n) = number.as_i64() {
        return n.to_string();
    }
    if let Some(n) = number.as_u64() {
        return n.to_string();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        _ => number.to_string(),
    }
}
