//! Solving one formula against a row.
//!
//! The text goes through a fixed pipeline: keywords, row keywords, column
//! references, relations, comparators and finally functions in registry
//! order. Each stage replaces every literal occurrence of a fragment's text
//! with its solved value before the next stage scans the result.

use chrono::{Local, NaiveDate};
use rcl_model::{Row, RowId, TableDao};
use tracing::{debug, trace};

use crate::config::FormulaConfig;
use crate::error::Result;
use crate::finder;
use crate::fragment::{CellPart, Comparator, FormulaList, Fragment, FragmentKind};
use crate::functions::{self, Call, FUNCTIONS};
use crate::keywords::{KeywordTable, ROW_ID, TABLE_NAME};

pub struct Evaluator<'a> {
    dao: &'a dyn TableDao,
    config: &'a FormulaConfig,
    today: Option<NaiveDate>,
}

impl<'a> Evaluator<'a> {
    pub fn new(dao: &'a dyn TableDao, config: &'a FormulaConfig) -> Self {
        Self {
            dao,
            config,
            today: None,
        }
    }

    /// Pins the date used by `%TODAY`, `%CURRENT_YEAR` and `%CURRENT_MONTH`.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &FormulaConfig {
        self.config
    }

    /// Solves the formula a column holds under `field_header`. A column
    /// without that header solves to `""`.
    pub fn solve(&self, row: &Row, column: &str, field_header: &str) -> Result<String> {
        let formula = row
            .schema()
            .column(column)
            .and_then(|c| c.field(field_header))
            .unwrap_or_default();
        let traced = self.config.trace_column.as_deref() == Some(column);
        let solved = self.run(row, formula, traced)?;
        debug!(
            table = row.table_name(),
            column,
            field_header,
            formula,
            solved = %solved,
            "formula solved"
        );
        Ok(solved)
    }

    /// Solves arbitrary formula text against a row.
    pub fn solve_text(&self, row: &Row, text: &str) -> Result<String> {
        self.run(row, text, false)
    }

    fn run(&self, row: &Row, formula: &str, traced: bool) -> Result<String> {
        if formula.trim().is_empty() {
            return Ok(String::new());
        }
        let keywords = KeywordTable::new(
            self.config,
            self.today.unwrap_or_else(|| Local::now().date_naive()),
        );

        let mut value = formula.to_string();

        value = self.substitute(finder::find_keywords(&value, &keywords), &value, row, &keywords)?;
        value = self.substitute(finder::find_row_keywords(&value), &value, row, &keywords)?;
        stage(traced, "keywords", &value);

        value = self.substitute(finder::find_columns(&value), &value, row, &keywords)?;
        stage(traced, "columns", &value);

        value = self.substitute(finder::find_relations(&value)?, &value, row, &keywords)?;
        stage(traced, "relations", &value);

        let mut comparisons = finder::find_comparators(&value, Comparator::Equal);
        comparisons.extend(finder::find_comparators(&value, Comparator::NotEqual));
        value = self.substitute(comparisons, &value, row, &keywords)?;
        stage(traced, "comparators", &value);

        for spec in FUNCTIONS {
            let calls = finder::find_function(&value, spec.name)?;
            if !calls.is_empty() {
                value = self.substitute(calls, &value, row, &keywords)?;
                stage(traced, spec.name, &value);
            }
        }

        Ok(value.trim().to_string())
    }

    fn substitute(
        &self,
        mut fragments: FormulaList,
        text: &str,
        row: &Row,
        keywords: &KeywordTable,
    ) -> Result<String> {
        let mut out = text.to_string();
        for fragment in fragments.iter_mut() {
            let solved = self.solve_fragment(fragment, row, keywords)?;
            out = out.replace(fragment.unsolved(), &solved);
            fragment.resolve(solved);
        }
        Ok(out)
    }

    fn solve_fragment(
        &self,
        fragment: &Fragment,
        row: &Row,
        keywords: &KeywordTable,
    ) -> Result<String> {
        let solved = match &fragment.kind {
            FragmentKind::Keyword { name } => keywords.get(name).unwrap_or_default().to_string(),
            FragmentKind::RowKeyword { name } => match name.as_str() {
                ROW_ID => row.id().map(|id| id.to_string()).unwrap_or_default(),
                TABLE_NAME => row.table_name().to_string(),
                _ => String::new(),
            },
            FragmentKind::Column { column, part } => {
                if row.schema().contains(column) {
                    read_part(row, column, *part).to_string()
                } else {
                    String::new()
                }
            }
            FragmentKind::Relation {
                parent,
                field,
                part,
            } => self.solve_relation(row, parent, field, *part)?,
            FragmentKind::Comparison {
                lhs,
                comparator,
                rhs,
            } => self
                .config
                .bool_text(comparator.apply(lhs, rhs))
                .to_string(),
            FragmentKind::Function { name, operands } => functions::call(
                name,
                &Call {
                    text: fragment.unsolved(),
                    operands,
                    config: self.config,
                },
            )?,
        };
        Ok(solved)
    }

    /// The row holds its parent's id as the code of the column named after
    /// the parent table.
    fn solve_relation(&self, row: &Row, parent: &str, field: &str, part: CellPart) -> Result<String> {
        let link = row.code(parent).trim();
        if link.is_empty() {
            return Ok(String::new());
        }
        let Ok(parent_id) = link.parse::<RowId>() else {
            debug!(table = row.table_name(), parent, link, "relation link is not a row id");
            return Ok(String::new());
        };
        let Some(parent_row) = self.dao.get_by_id(parent, parent_id)? else {
            debug!(parent, %parent_id, "relation parent not found");
            return Ok(String::new());
        };
        Ok(read_part(&parent_row, field, part).to_string())
    }
}

fn read_part<'r>(row: &'r Row, column: &str, part: CellPart) -> &'r str {
    match part {
        CellPart::Code => row.code(column),
        CellPart::Label => row.label(column),
    }
}

fn stage(traced: bool, stage: &str, value: &str) {
    if traced {
        debug!(stage, value, "formula stage");
    } else {
        trace!(stage, value, "formula stage");
    }
}
