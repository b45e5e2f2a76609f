use thiserror::Error;

use crate::ids::RowId;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate column '{column}' in table {table}")]
    DuplicateColumn { table: String, column: String },
    #[error("empty column id in table {table}")]
    EmptyColumnId { table: String },
    #[error("unknown table schema: {0}")]
    UnknownSchema(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of a [`crate::TableDao`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table store lock poisoned")]
    LockPoisoned,
    #[error("row of table {table} has no database id")]
    MissingId { table: String },
    #[error("row {id} not found in table {table}")]
    NotFound { table: String, id: RowId },
}

pub type Result<T> = std::result::Result<T, ModelError>;
