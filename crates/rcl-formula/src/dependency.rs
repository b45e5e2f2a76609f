//! Dependency counting between the formulas of one table.
//!
//! A formula depends on another column of the same schema when it references
//! it as `%column.code` or `%column.label`. The count adds every occurrence
//! plus, recursively, the count of each referenced column, so formulas can be
//! solved leaves first.

use std::collections::HashMap;

use rcl_model::Schema;
use tracing::trace;

use crate::error::{FormulaError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    table: String,
    column: String,
    header: String,
}

/// Memoized dependency counts, owned by one solving session.
///
/// Entries are tied to the schema revision they were computed against; a
/// lookup with a reloaded schema drops the stale entries of that table.
#[derive(Debug, Default)]
pub struct DependencyCache {
    counts: HashMap<CacheKey, usize>,
    revisions: HashMap<String, u64>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.revisions.clear();
    }

    pub fn invalidate_table(&mut self, table: &str) {
        self.counts.retain(|key, _| key.table != table);
        self.revisions.remove(table);
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Cached count, if one exists for the current revision of `schema`.
    pub fn get(&self, schema: &Schema, column: &str, header: &str) -> Option<usize> {
        if self.revisions.get(schema.sheet_name()) != Some(&schema.revision()) {
            return None;
        }
        self.counts
            .get(&CacheKey {
                table: schema.sheet_name().to_string(),
                column: column.to_string(),
                header: header.to_string(),
            })
            .copied()
    }

    /// Dependency count of the formula stored under `header` for `column`.
    pub fn dependency_count(&mut self, schema: &Schema, column: &str, header: &str) -> Result<usize> {
        let table = schema.sheet_name();
        if self
            .revisions
            .get(table)
            .is_some_and(|revision| *revision != schema.revision())
        {
            trace!(table, revision = schema.revision(), "schema reloaded, dropping cached counts");
            self.invalidate_table(table);
        }
        self.revisions.insert(table.to_string(), schema.revision());

        let mut path = Vec::new();
        self.count(schema, column, header, &mut path)
    }

    fn count(
        &mut self,
        schema: &Schema,
        column: &str,
        header: &str,
        path: &mut Vec<String>,
    ) -> Result<usize> {
        let key = CacheKey {
            table: schema.sheet_name().to_string(),
            column: column.to_string(),
            header: header.to_string(),
        };
        if let Some(count) = self.counts.get(&key) {
            return Ok(*count);
        }
        if path.iter().any(|visited| visited == column) {
            path.push(column.to_string());
            return Err(FormulaError::CyclicDependency {
                table: schema.sheet_name().to_string(),
                path: path.join(" -> "),
            });
        }

        path.push(column.to_string());
        let formula = schema
            .column(column)
            .and_then(|c| c.field(header))
            .unwrap_or_default();

        let mut total = 0;
        for other in schema.columns() {
            if other.id == column {
                continue;
            }
            let occurrences = count_references(formula, &other.id);
            if occurrences > 0 {
                total += occurrences + self.count(schema, &other.id, header, path)?;
            }
        }
        path.pop();

        self.counts.insert(key, total);
        Ok(total)
    }
}

/// Occurrences of `%column.code` / `%column.label` in a formula.
pub fn count_references(formula: &str, column: &str) -> usize {
    let prefix = format!("%{column}.");
    formula
        .match_indices(&prefix)
        .filter(|(at, _)| {
            let rest = &formula[at + prefix.len()..];
            rest.starts_with("code") || rest.starts_with("label")
        })
        .count()
}
