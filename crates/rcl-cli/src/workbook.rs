//! JSON workbooks: table schemas plus the rows stored in them.
//!
//! ```json
//! {
//!   "schemas": [{ "sheetName": "Report", "columns": [{ "id": "country" }] }],
//!   "rows": { "Report": [{ "id": 1, "cells": { "country": { "code": "IT" } } }] }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rcl_model::{InMemoryTableDao, Row, RowData, RowId, Schema, SchemaRegistry, TableDao};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WorkbookFile {
    #[serde(default)]
    pub schemas: Vec<Schema>,
    #[serde(default)]
    pub rows: BTreeMap<String, Vec<RowData>>,
}

/// A loaded workbook: its schemas and an in-memory store holding its rows.
#[derive(Debug, Default)]
pub struct Workbook {
    registry: SchemaRegistry,
    dao: InMemoryTableDao,
}

impl Workbook {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read workbook {}", path.display()))?;
        Self::from_json_str(&contents).with_context(|| format!("load workbook {}", path.display()))
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let file: WorkbookFile = serde_json::from_str(contents).context("parse workbook JSON")?;
        Self::from_file(file)
    }

    pub fn from_file(file: WorkbookFile) -> Result<Self> {
        let mut workbook = Self::default();
        for schema in file.schemas {
            workbook.registry.load(schema);
        }
        for (table, rows) in file.rows {
            let schema = workbook
                .registry
                .get(&table)
                .with_context(|| format!("rows given for table {table}"))?;
            for data in rows {
                let mut row = Row::from_data(Arc::clone(&schema), data);
                workbook
                    .dao
                    .insert(&mut row)
                    .with_context(|| format!("store row of {table}"))?;
            }
        }
        debug!(tables = workbook.registry.len(), "workbook loaded");
        Ok(workbook)
    }

    pub fn schema(&self, table: &str) -> Result<Arc<Schema>> {
        Ok(self.registry.get(table)?)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    pub fn dao(&self) -> &InMemoryTableDao {
        &self.dao
    }

    /// Rows of a table, or the single row `id` when given.
    pub fn rows(&self, table: &str, id: Option<RowId>) -> Result<Vec<Row>> {
        self.schema(table)?;
        match id {
            Some(id) => {
                let row = self
                    .dao
                    .get_by_id(table, id)?
                    .with_context(|| format!("no row {id} in table {table}"))?;
                Ok(vec![row])
            }
            None => Ok(self.dao.all(table)?),
        }
    }
}
