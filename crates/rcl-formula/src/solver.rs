//! Solving every formula of a row in dependency order.

use rcl_model::{Row, TableDao};
use tracing::debug;

use crate::config::FormulaConfig;
use crate::dependency::DependencyCache;
use crate::error::Result;
use crate::evaluator::Evaluator;

/// A column formula of one field header, with its solved value once solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    pub column: String,
    pub field_header: String,
    pub text: String,
    pub dependencies: usize,
    pub solved: Option<String>,
}

impl Formula {
    pub fn solved_text(&self) -> &str {
        self.solved.as_deref().unwrap_or_default()
    }
}

/// Solves the formulas of rows, memoizing dependency counts across calls.
pub struct FormulaSolver<'a> {
    evaluator: Evaluator<'a>,
    cache: DependencyCache,
}

impl<'a> FormulaSolver<'a> {
    pub fn new(dao: &'a dyn TableDao, config: &'a FormulaConfig) -> Self {
        Self::with_evaluator(Evaluator::new(dao, config))
    }

    pub fn with_evaluator(evaluator: Evaluator<'a>) -> Self {
        Self {
            evaluator,
            cache: DependencyCache::new(),
        }
    }

    pub fn evaluator(&self) -> &Evaluator<'a> {
        &self.evaluator
    }

    pub fn cache(&self) -> &DependencyCache {
        &self.cache
    }

    /// Drops every memoized dependency count.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// The unsolved formula of one column.
    pub fn parse(&mut self, row: &Row, column: &str, field_header: &str) -> Result<Formula> {
        let schema = row.schema();
        let text = schema
            .column(column)
            .and_then(|c| c.field(field_header))
            .unwrap_or_default()
            .to_string();
        let dependencies = self.cache.dependency_count(schema, column, field_header)?;
        Ok(Formula {
            column: column.to_string(),
            field_header: field_header.to_string(),
            text,
            dependencies,
            solved: None,
        })
    }

    /// Unsolved formulas of every column defining `field_header`, in schema order.
    pub fn parse_all(&mut self, row: &Row, field_header: &str) -> Result<Vec<Formula>> {
        let schema = std::sync::Arc::clone(row.schema());
        schema
            .columns()
            .iter()
            .filter(|column| column.field(field_header).is_some())
            .map(|column| self.parse(row, &column.id, field_header))
            .collect()
    }

    /// Solves one column without writing into the row.
    pub fn solve(&mut self, row: &Row, column: &str, field_header: &str) -> Result<Formula> {
        let mut formula = self.parse(row, column, field_header)?;
        formula.solved = Some(self.evaluator.solve(row, column, field_header)?);
        Ok(formula)
    }

    /// Solves every formula of `field_header`, fewest dependencies first,
    /// writing each non-empty result into the row before the next one is
    /// solved. Returns the formulas that produced a value.
    pub fn solve_all(&mut self, row: &mut Row, field_header: &str) -> Result<Vec<Formula>> {
        let mut formulas = self.parse_all(row, field_header)?;
        formulas.sort_by_key(|formula| formula.dependencies);

        let mut solved = Vec::with_capacity(formulas.len());
        for mut formula in formulas {
            let value = self.evaluator.solve(row, &formula.column, field_header)?;
            if value.is_empty() {
                continue;
            }
            debug!(
                column = %formula.column,
                dependencies = formula.dependencies,
                value = %value,
                "formula solved"
            );
            row.update(&formula.column, &value, field_header);
            formula.solved = Some(value);
            solved.push(formula);
        }
        debug!(
            table = row.table_name(),
            field_header,
            solved = solved.len(),
            "row formulas solved"
        );
        Ok(solved)
    }
}
