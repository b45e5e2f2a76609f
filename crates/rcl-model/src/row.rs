use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::headers::WriteTarget;
use crate::ids::RowId;
use crate::schema::Schema;

/// Serialized form of a row, without its schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    #[serde(default)]
    pub cells: BTreeMap<String, Cell>,
}

/// One record of a table.
#[derive(Debug, Clone)]
pub struct Row {
    id: Option<RowId>,
    schema: Arc<Schema>,
    cells: BTreeMap<String, Cell>,
}

impl Row {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            id: None,
            schema,
            cells: BTreeMap::new(),
        }
    }

    pub fn from_data(schema: Arc<Schema>, data: RowData) -> Self {
        Self {
            id: data.id,
            schema,
            cells: data.cells,
        }
    }

    pub fn to_data(&self) -> RowData {
        RowData {
            id: self.id,
            cells: self.cells.clone(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: RowId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_cell(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.put(column, cell);
        self
    }

    pub fn id(&self) -> Option<RowId> {
        self.id
    }

    pub fn set_id(&mut self, id: RowId) {
        self.id = Some(id);
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn table_name(&self) -> &str {
        self.schema.sheet_name()
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Code of a cell, `""` when absent.
    pub fn code(&self, column: &str) -> &str {
        self.cells.get(column).map_or("", |cell| cell.code.as_str())
    }

    /// Label of a cell (falling back to its code), `""` when absent.
    pub fn label(&self, column: &str) -> &str {
        self.cells.get(column).map_or("", Cell::label_or_code)
    }

    pub fn put(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.insert(column.into(), cell);
    }

    pub fn put_code(&mut self, column: impl Into<String>, code: impl Into<String>) {
        self.put(column, Cell::plain(code));
    }

    pub fn remove(&mut self, column: &str) -> Option<Cell> {
        self.cells.remove(column)
    }

    /// Writes a solved value into the part of the cell the field header owns.
    pub fn update(&mut self, column: &str, value: &str, field_header: &str) {
        let cell = self.cells.entry(column.to_string()).or_default();
        match WriteTarget::for_header(field_header) {
            WriteTarget::Label => cell.label = Some(value.to_string()),
            WriteTarget::Code => cell.code = value.to_string(),
            WriteTarget::Both => {
                cell.code = value.to_string();
                cell.label = Some(value.to_string());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(column, cell)| (column.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{CODE_FORMULA, DEFAULT_VALUE, LABEL_FORMULA};
    use crate::schema::Column;

    fn row() -> Row {
        let schema = Schema::new("T", vec![Column::new("a")]).unwrap();
        Row::new(Arc::new(schema))
    }

    #[test]
    fn absent_cells_read_empty() {
        let row = row();
        assert_eq!(row.code("a"), "");
        assert_eq!(row.label("missing"), "");
    }

    #[test]
    fn update_follows_header() {
        let mut row = row().with_cell("a", Cell::labelled("c", "l"));

        row.update("a", "L2", LABEL_FORMULA);
        assert_eq!(row.get("a"), Some(&Cell::labelled("c", "L2")));

        row.update("a", "C2", CODE_FORMULA);
        assert_eq!(row.get("a"), Some(&Cell::labelled("C2", "L2")));

        row.update("a", "X", DEFAULT_VALUE);
        assert_eq!(row.get("a"), Some(&Cell::labelled("X", "X")));
    }

    #[test]
    fn label_update_on_absent_cell_keeps_empty_code() {
        let mut row = row();
        row.update("a", "only label", LABEL_FORMULA);
        assert_eq!(row.code("a"), "");
        assert_eq!(row.label("a"), "only label");
    }
}
