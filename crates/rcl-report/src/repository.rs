use std::sync::Arc;

use rcl_model::{RowId, Schema, TableDao};

use crate::columns;
use crate::error::{ReportError, Result};
use crate::report::Report;

/// Typed access to the `Report` table through a [`TableDao`].
#[derive(Clone)]
pub struct ReportRepository {
    dao: Arc<dyn TableDao>,
    schema: Arc<Schema>,
}

impl std::fmt::Debug for ReportRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportRepository")
            .field("table", &self.schema.sheet_name())
            .finish_non_exhaustive()
    }
}

impl ReportRepository {
    pub fn new(dao: Arc<dyn TableDao>, schema: Arc<Schema>) -> Self {
        Self { dao, schema }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn table(&self) -> &str {
        self.schema.sheet_name()
    }

    /// An unsaved report of this table.
    pub fn new_report(&self) -> Report {
        Report::new(Arc::clone(&self.schema))
    }

    pub fn all(&self) -> Result<Vec<Report>> {
        Ok(self
            .dao
            .all(self.table())?
            .into_iter()
            .map(Report::from)
            .collect())
    }

    pub fn get(&self, id: RowId) -> Result<Option<Report>> {
        Ok(self.dao.get_by_id(self.table(), id)?.map(Report::from))
    }

    pub fn by_field(&self, field: &str, code: &str) -> Result<Vec<Report>> {
        Ok(self
            .dao
            .get_by_field(self.table(), field, code)?
            .into_iter()
            .map(Report::from)
            .collect())
    }

    /// Reports sent through the given aggregator.
    pub fn by_aggregator(&self, aggregator: RowId) -> Result<Vec<Report>> {
        self.by_field(columns::AGGREGATOR_ID, &aggregator.to_string())
    }

    /// Every stored version of a report.
    pub fn versions(&self, sender_id: &str) -> Result<Vec<Report>> {
        self.by_field(columns::SENDER_ID, sender_id)
    }

    pub fn insert(&self, report: &mut Report) -> Result<RowId> {
        Ok(self.dao.insert(report.row_mut())?)
    }

    pub fn update(&self, report: &Report) -> Result<()> {
        if report.id().is_none() {
            return Err(ReportError::Unsaved {
                sender_id: report.sender_id().to_string(),
            });
        }
        Ok(self.dao.update(report.row())?)
    }

    pub fn delete(&self, id: RowId) -> Result<bool> {
        Ok(self.dao.delete(self.table(), id)?)
    }
}
