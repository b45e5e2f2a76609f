use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, Result};

/// A table column and the formula text attached to each of its field headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Field header -> raw formula text.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Column {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_field(mut self, header: impl Into<String>, formula: impl Into<String>) -> Self {
        self.fields.insert(header.into(), formula.into());
        self
    }

    /// Raw formula text for a field header; `None` if the column has none.
    pub fn field(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(String::as_str)
    }
}

static LAST_REVISION: AtomicU64 = AtomicU64::new(0);

/// Process-wide, strictly increasing schema revision.
fn next_revision() -> u64 {
    LAST_REVISION.fetch_add(1, Ordering::Relaxed) + 1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDef {
    sheet_name: String,
    #[serde(default)]
    columns: Vec<Column>,
}

impl TryFrom<SchemaDef> for Schema {
    type Error = ModelError;

    fn try_from(def: SchemaDef) -> Result<Self> {
        Schema::new(def.sheet_name, def.columns)
    }
}

/// Column definitions of one table. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef", rename_all = "camelCase")]
pub struct Schema {
    sheet_name: String,
    columns: Vec<Column>,
    #[serde(skip)]
    revision: u64,
}

impl Schema {
    pub fn new(sheet_name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let sheet_name = sheet_name.into();
        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.id.trim().is_empty() {
                return Err(ModelError::EmptyColumnId { table: sheet_name });
            }
            if !seen.insert(column.id.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    table: sheet_name.clone(),
                    column: column.id.clone(),
                });
            }
        }
        Ok(Self {
            sheet_name,
            columns,
            revision: next_revision(),
        })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.column(id).is_some()
    }

    /// Unique per built or loaded definition; clones share it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Loaded schemas by sheet name.
///
/// Every load stamps the schema with a fresh revision, so caches keyed on a
/// schema can tell a reloaded definition from the one they were built against.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a schema, replacing any previous definition of the same table.
    pub fn load(&mut self, mut schema: Schema) -> Arc<Schema> {
        schema.revision = next_revision();
        debug!(
            table = %schema.sheet_name,
            revision = schema.revision,
            columns = schema.columns.len(),
            "schema loaded"
        );
        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.sheet_name.clone(), Arc::clone(&schema));
        schema
    }

    pub fn get(&self, name: &str) -> Result<Arc<Schema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownSchema(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
