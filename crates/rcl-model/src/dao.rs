//! Table access.
//!
//! [`TableDao`] is the capability the formula engine and the report lifecycle
//! use to read and persist rows. Methods take `&self` so a store can be shared
//! with background workers behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::error::StoreError;
use crate::ids::RowId;
use crate::row::Row;

pub trait TableDao: Send + Sync {
    fn get_by_id(&self, table: &str, id: RowId) -> Result<Option<Row>, StoreError>;

    /// Rows of `table` whose `field` cell has the given code.
    fn get_by_field(&self, table: &str, field: &str, code: &str) -> Result<Vec<Row>, StoreError>;

    fn all(&self, table: &str) -> Result<Vec<Row>, StoreError>;

    /// Stores a new row. A row without id gets a fresh one, which is also
    /// written back into `row`.
    fn insert(&self, row: &mut Row) -> Result<RowId, StoreError>;

    /// Replaces a stored row. Fails when the row has no id or is not stored.
    fn update(&self, row: &Row) -> Result<(), StoreError>;

    /// Removes a row; returns whether it existed.
    fn delete(&self, table: &str, id: RowId) -> Result<bool, StoreError>;
}

type Tables = BTreeMap<String, BTreeMap<RowId, Row>>;

/// [`TableDao`] backed by in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryTableDao {
    tables: RwLock<Tables>,
    last_id: AtomicU64,
}

impl InMemoryTableDao {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn count(&self, table: &str) -> Result<usize, StoreError> {
        Ok(self.read()?.get(table).map_or(0, BTreeMap::len))
    }
}

impl TableDao for InMemoryTableDao {
    fn get_by_id(&self, table: &str, id: RowId) -> Result<Option<Row>, StoreError> {
        Ok(self
            .read()?
            .get(table)
            .and_then(|rows| rows.get(&id))
            .cloned())
    }

    fn get_by_field(&self, table: &str, field: &str, code: &str) -> Result<Vec<Row>, StoreError> {
        Ok(self
            .read()?
            .get(table)
            .map(|rows| {
                rows.values()
                    .filter(|row| row.code(field) == code)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn all(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        Ok(self
            .read()?
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    fn insert(&self, row: &mut Row) -> Result<RowId, StoreError> {
        let id = match row.id() {
            Some(id) => {
                self.last_id.fetch_max(id.get(), Ordering::SeqCst);
                id
            }
            None => {
                let id = RowId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
                row.set_id(id);
                id
            }
        };
        trace!(table = row.table_name(), %id, "insert row");
        self.write()?
            .entry(row.table_name().to_string())
            .or_default()
            .insert(id, row.clone());
        Ok(id)
    }

    fn update(&self, row: &Row) -> Result<(), StoreError> {
        let table = row.table_name();
        let id = row.id().ok_or_else(|| StoreError::MissingId {
            table: table.to_string(),
        })?;
        let mut tables = self.write()?;
        let slot = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                id,
            })?;
        trace!(table, %id, "update row");
        *slot = row.clone();
        Ok(())
    }

    fn delete(&self, table: &str, id: RowId) -> Result<bool, StoreError> {
        let removed = self
            .write()?
            .get_mut(table)
            .is_some_and(|rows| rows.remove(&id).is_some());
        trace!(table, %id, removed, "delete row");
        Ok(removed)
    }
}
