//! Tests for rcl-model schema loading and the in-memory table store.

use std::sync::Arc;

use rcl_model::{
    Cell, Column, InMemoryTableDao, Row, RowData, RowId, Schema, SchemaRegistry, StoreError,
    TableDao,
};

fn country_schema() -> Arc<Schema> {
    let mut registry = SchemaRegistry::new();
    registry.load(
        Schema::new(
            "Country",
            vec![Column::new("code"), Column::new("name").with_label("Name")],
        )
        .expect("valid schema"),
    )
}

#[test]
fn schema_deserializes_from_json() {
    let json = r#"{
        "sheetName": "Report",
        "columns": [
            { "id": "reportYear" },
            { "id": "senderId", "fields": { "codeFormula": "%dcCode.code" } }
        ]
    }"#;
    let schema: Schema = serde_json::from_str(json).expect("deserialize schema");
    assert_eq!(schema.sheet_name(), "Report");
    assert_eq!(
        schema.column("senderId").and_then(|c| c.field("codeFormula")),
        Some("%dcCode.code")
    );
    assert_ne!(schema.revision(), 0);
}

#[test]
fn schema_json_rejects_duplicate_columns() {
    let json = r#"{ "sheetName": "T", "columns": [ { "id": "a" }, { "id": "a" } ] }"#;
    let result: Result<Schema, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn row_data_round_trip_keeps_cells() {
    let schema = country_schema();
    let row = Row::new(Arc::clone(&schema))
        .with_id(RowId::new(7))
        .with_cell("code", Cell::labelled("IT", "Italy"));
    let json = serde_json::to_string(&row.to_data()).expect("serialize row");
    let data: RowData = serde_json::from_str(&json).expect("deserialize row");
    let back = Row::from_data(schema, data);
    assert_eq!(back.id(), Some(RowId::new(7)));
    assert_eq!(back.label("code"), "Italy");
}

#[test]
fn insert_assigns_ids_and_lookup_by_field() {
    let dao = InMemoryTableDao::new();
    let schema = country_schema();

    let mut italy = Row::new(Arc::clone(&schema)).with_cell("code", Cell::plain("IT"));
    let mut france = Row::new(Arc::clone(&schema)).with_cell("code", Cell::plain("FR"));
    let first = dao.insert(&mut italy).expect("insert");
    let second = dao.insert(&mut france).expect("insert");

    assert_ne!(first, second);
    assert_eq!(italy.id(), Some(first));

    let found = dao.get_by_field("Country", "code", "FR").expect("query");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), Some(second));
    assert_eq!(dao.all("Country").expect("all").len(), 2);
    assert!(dao.all("Unknown").expect("all").is_empty());
}

#[test]
fn insert_with_explicit_id_advances_sequence() {
    let dao = InMemoryTableDao::new();
    let schema = country_schema();

    let mut imported = Row::new(Arc::clone(&schema)).with_id(RowId::new(40));
    dao.insert(&mut imported).expect("insert");
    let mut fresh = Row::new(schema);
    let id = dao.insert(&mut fresh).expect("insert");
    assert_eq!(id, RowId::new(41));
}

#[test]
fn update_requires_stored_row() {
    let dao = InMemoryTableDao::new();
    let schema = country_schema();

    let unsaved = Row::new(Arc::clone(&schema));
    assert!(matches!(
        dao.update(&unsaved),
        Err(StoreError::MissingId { .. })
    ));

    let ghost = Row::new(Arc::clone(&schema)).with_id(RowId::new(99));
    assert!(matches!(dao.update(&ghost), Err(StoreError::NotFound { .. })));

    let mut row = Row::new(schema);
    let id = dao.insert(&mut row).expect("insert");
    row.put_code("code", "DE");
    dao.update(&row).expect("update");
    let stored = dao.get_by_id("Country", id).expect("get").expect("present");
    assert_eq!(stored.code("code"), "DE");
}

#[test]
fn delete_reports_presence() {
    let dao = InMemoryTableDao::new();
    let mut row = Row::new(country_schema());
    let id = dao.insert(&mut row).expect("insert");
    assert!(dao.delete("Country", id).expect("delete"));
    assert!(!dao.delete("Country", id).expect("delete"));
    assert_eq!(dao.count("Country").expect("count"), 0);
}
