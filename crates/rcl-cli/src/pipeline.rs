//! Workbook operations behind the `solve` and `deps` commands.

use anyhow::{Context, Result};
use rcl_formula::{DependencyCache, FormulaConfig, FormulaSolver};
use rcl_model::{RowId, TableDao};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::workbook::Workbook;

/// Values written into one row by the solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolvedRow {
    pub id: Option<RowId>,
    /// Column -> solved text, in solving order.
    pub values: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDependencies {
    pub column: String,
    pub formula: String,
    pub dependencies: usize,
}

/// Solves every formula of `field_header` in the rows of `table` and stores
/// the updated rows back into the workbook.
pub fn solve_table(
    workbook: &Workbook,
    config: &FormulaConfig,
    table: &str,
    field_header: &str,
    row_id: Option<RowId>,
) -> Result<Vec<SolvedRow>> {
    let span = info_span!("solve", table, field_header);
    let _guard = span.enter();

    let mut solver = FormulaSolver::new(workbook.dao(), config);
    let mut solved = Vec::new();
    for mut row in workbook.rows(table, row_id)? {
        let formulas = solver
            .solve_all(&mut row, field_header)
            .with_context(|| match row.id() {
                Some(id) => format!("solve row {id} of {table}"),
                None => format!("solve row of {table}"),
            })?;
        workbook.dao().update(&row)?;
        solved.push(SolvedRow {
            id: row.id(),
            values: formulas
                .into_iter()
                .map(|formula| {
                    let value = formula.solved_text().to_string();
                    (formula.column, value)
                })
                .collect(),
        });
    }
    debug!(rows = solved.len(), "table solved");
    Ok(solved)
}

/// Dependency count of every column of `table` defining `field_header`,
/// ascending as the solver would process them.
pub fn dependency_counts(
    workbook: &Workbook,
    table: &str,
    field_header: &str,
) -> Result<Vec<ColumnDependencies>> {
    let schema = workbook.schema(table)?;
    let mut cache = DependencyCache::new();
    let mut counts = Vec::new();
    for column in schema.columns() {
        let Some(formula) = column.field(field_header) else {
            continue;
        };
        let dependencies = cache
            .dependency_count(&schema, &column.id, field_header)
            .with_context(|| format!("count dependencies of {}", column.id))?;
        counts.push(ColumnDependencies {
            column: column.id.clone(),
            formula: formula.to_string(),
            dependencies,
        });
    }
    counts.sort_by_key(|entry| entry.dependencies);
    Ok(counts)
}
