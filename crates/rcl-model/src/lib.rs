//! Table model shared by the formula engine and the report lifecycle.
//!
//! - **schema**: column definitions with per-header formula text
//! - **row**: one record of a table, keyed by column id
//! - **headers**: field-header names and the cell part each one writes
//! - **dao**: the table-access capability and an in-memory implementation

pub mod cell;
pub mod dao;
pub mod error;
pub mod headers;
pub mod ids;
pub mod row;
pub mod schema;

pub use cell::Cell;
pub use dao::{InMemoryTableDao, TableDao};
pub use error::{ModelError, Result, StoreError};
pub use headers::WriteTarget;
pub use ids::RowId;
pub use row::{Row, RowData};
pub use schema::{Column, Schema, SchemaRegistry};
