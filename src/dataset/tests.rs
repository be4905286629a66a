//! Tests for dataset module

use super::*;
use crate::error::ErrorKind;
use crate::normalize::{Cell, ColumnType};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

const MINIMAL: &str = r#"
provider: acme
name: widgets
format:
  type: record_array
  records_key: data.items
columns:
  - name: id
    type: string
"#;

// ============================================================================
// Definition Loading Tests
// ============================================================================

#[test]
fn test_load_minimal_definition() {
    let def = load_definition_from_str(MINIMAL).unwrap();
    assert_eq!(def.identity(), DatasetIdentity::new("acme", "widgets"));
    assert_eq!(
        def.format,
        FormatSpec::RecordArray {
            records_key: Some("data.items".to_string())
        }
    );
    assert_eq!(def.columns.len(), 1);
    assert!(def.reshape.is_none());
}

#[test]
fn test_load_top_level_array_definition() {
    let yaml = r#"
provider: acme
name: widgets
format: { type: record_array }
columns: [ { name: id, type: string } ]
"#;
    let def = load_definition_from_str(yaml).unwrap();
    assert_eq!(def.format, FormatSpec::RecordArray { records_key: None });
    assert_eq!(def.format.extension(), "json");
}

#[test]
fn test_column_defaults() {
    let yaml = r#"
provider: acme
name: widgets
format: { type: record_array }
columns:
  - name: tags
    type: flattened_list
"#;
    let def = load_definition_from_str(yaml).unwrap();
    let column = &def.columns[0];
    assert_eq!(column.column_type, ColumnType::FlattenedList);
    assert_eq!(column.item_field, "name");
    assert!(!column.trim);
    assert!(!column.nullable);
}

#[test]
fn test_load_definition_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("widgets.yaml");
    std::fs::write(&path, MINIMAL).unwrap();

    let def = load_definition(&path).unwrap();
    assert_eq!(def.name, "widgets");
}

#[test]
fn test_load_definition_missing_file() {
    let err = load_definition("/nonexistent/widgets.yaml").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_invalid_yaml() {
    let err = load_definition_from_str("provider: [").unwrap_err();
    assert!(err.to_string().contains("Failed to parse dataset YAML"));
}

#[test]
fn test_unknown_column_type() {
    let yaml = MINIMAL.replace("type: string", "type: decimal");
    assert!(load_definition_from_str(&yaml).is_err());
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_validate_date_requires_format() {
    let yaml = MINIMAL.replace("type: string", "type: date");
    let err = load_definition_from_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("requires a format"));
}

#[test]
fn test_validate_trim_only_on_strings() {
    let yaml = MINIMAL.replace("type: string", "type: integer\n    trim: true");
    let err = load_definition_from_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("trim applies to string columns only"));
}

#[test]
fn test_validate_duplicate_columns() {
    let yaml = format!("{MINIMAL}  - name: id\n    type: integer\n");
    let err = load_definition_from_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate column 'id'"));
}

#[test]
fn test_validate_no_columns() {
    let yaml = r#"
provider: acme
name: widgets
format: { type: record_array }
columns: []
"#;
    assert!(load_definition_from_str(yaml).is_err());
}

#[test]
fn test_validate_spreadsheet_needs_reshape() {
    let yaml = r#"
provider: acme
name: beds
format: { type: spreadsheet, sheet: Beds, header_rows: [0, 1] }
columns: [ { name: Name, type: string } ]
"#;
    let err = load_definition_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("reshape"));
}

#[test]
fn test_validate_spreadsheet_header_rows() {
    let yaml = r#"
provider: acme
name: beds
format: { type: spreadsheet, sheet: Beds, header_rows: [3] }
reshape: { identity: [Name] }
columns: [ { name: Name, type: string } ]
"#;
    let err = load_definition_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("header_rows"));
}

#[test]
fn test_validate_record_array_rejects_reshape() {
    let yaml = format!("{MINIMAL}reshape: {{ identity: [id] }}\n");
    assert!(load_definition_from_str(&yaml).is_err());
}

#[test]
fn test_reshape_default_date_column() {
    let yaml = r#"
provider: acme
name: beds
format: { type: spreadsheet, sheet: Beds, header_rows: [0, 1] }
reshape: { identity: [Name] }
columns: [ { name: Name, type: string } ]
"#;
    let def = load_definition_from_str(yaml).unwrap();
    assert_eq!(def.reshape.unwrap().date_column, "Date");
}

// ============================================================================
// Built-in Definition Tests
// ============================================================================

#[test]
fn test_builtin_definitions_load() {
    let defs = builtin_definitions().unwrap();
    let ids: Vec<String> = defs.iter().map(|d| d.identity().to_string()).collect();
    assert_eq!(ids, vec!["dit/trade-barriers", "ea/floods", "nhs/uec-sitrep"]);
}

#[test]
fn test_builtin_floods_schema() {
    let defs = builtin_definitions().unwrap();
    let floods = defs.iter().find(|d| d.name == "floods").unwrap();

    let names: Vec<&str> = floods.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "id",
            "description",
            "eaAreaName",
            "floodAreaID",
            "message",
            "severity",
            "isTidal",
            "severityLevel",
            "timeMessageChanged",
            "timeRaised",
            "timeSeverityChanged",
        ]
    );
    assert_eq!(floods.columns[0].source_name(), "@id");
    assert!(floods.columns[1].trim);
}

#[test]
fn test_builtin_sitrep_shape() {
    let defs = builtin_definitions().unwrap();
    let sitrep = defs.iter().find(|d| d.provider == "nhs").unwrap();

    assert_eq!(
        sitrep.format,
        FormatSpec::Spreadsheet {
            sheet: "Total G&A beds".to_string(),
            header_rows: vec![13, 14],
        }
    );
    assert_eq!(
        sitrep.reshape.as_ref().unwrap().identity,
        vec!["Name", "Code", "NHS England Region"]
    );
    assert_eq!(
        sitrep.columns[5].name,
        "Total G&A Beds Unavailable to non-covid admissions \"void\""
    );
}

// ============================================================================
// Handler Tests
// ============================================================================

#[test]
fn test_declarative_trade_barriers() {
    let registry = DatasetRegistry::with_builtins().unwrap();
    let handler = registry
        .get(&DatasetIdentity::new("DIT", "Trade-Barriers"))
        .unwrap();

    let body = br#"{"barriers": [{
        "id": "b1", "title": "Steel tariffs", "summary": "s", "trading_bloc": null,
        "location": "France", "categories": "Goods", "is_resolved": false,
        "caused_by_trading_bloc": null, "status_date": "2023-05-01",
        "last_published_on": "2023-05-02T09:30:00.123Z",
        "reported_on": "2023-04-30T12:00:00Z",
        "country": {"name": "France", "trading_bloc": null},
        "sectors": [{"name": "Steel"}, {"name": "Automotive"}]
    }]}"#;

    let raw = handler.parse(body).unwrap();
    let table = handler.normalize(raw).unwrap();

    assert_eq!(table.num_rows(), 1);
    assert_eq!(table.cell(0, "trading_bloc"), Some(&Cell::Null));
    assert_eq!(table.cell(0, "is_resolved"), Some(&Cell::Boolean(false)));
    assert_eq!(
        table.cell(0, "status_date"),
        Some(&Cell::Date(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()))
    );
    assert_eq!(
        table.cell(0, "sectors"),
        Some(&Cell::List(vec!["Steel".to_string(), "Automotive".to_string()]))
    );
    let Some(Cell::Timestamp(ts)) = table.cell(0, "last_published_on") else {
        panic!("Expected timestamp");
    };
    assert_eq!(ts.and_utc().timestamp_subsec_millis(), 123);
}

#[test]
fn test_declarative_dataset_rejects_invalid_definition() {
    let mut def = load_definition_from_str(MINIMAL).unwrap();
    def.columns.clear();
    assert!(DeclarativeDataset::new(def).is_err());
}

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_registry_unknown_dataset() {
    let registry = DatasetRegistry::with_builtins().unwrap();
    let err = registry
        .get(&DatasetIdentity::new("ons", "population"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownDataset);
    assert!(err.to_string().contains("ons/population"));
}

#[test]
fn test_registry_case_insensitive() {
    let registry = DatasetRegistry::with_builtins().unwrap();
    assert!(registry.contains(&DatasetIdentity::new("EA", "FLOODS")));
    assert_eq!(registry.len(), 3);
}

#[test]
fn test_registry_load_dir_overrides_builtin() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("floods.yaml"),
        r#"
provider: EA
name: Floods
description: trimmed-down floods
format: { type: record_array, records_key: items }
columns: [ { name: id, source: "@id", type: string } ]
"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("widgets.yml"), MINIMAL).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let mut registry = DatasetRegistry::with_builtins().unwrap();
    let loaded = registry.load_dir(dir.path()).unwrap();

    assert_eq!(loaded, 2);
    assert_eq!(registry.len(), 4);
    let floods = registry
        .summaries()
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case("floods"))
        .unwrap();
    assert_eq!(floods.columns, 1);
    assert_eq!(floods.description.as_deref(), Some("trimmed-down floods"));
}

#[test]
fn test_registry_load_dir_invalid_definition() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.yaml"), "provider: x\nname: y\n").unwrap();

    let mut registry = DatasetRegistry::new();
    assert!(registry.load_dir(dir.path()).is_err());
    assert!(registry.is_empty());
}

#[test]
fn test_registry_load_dir_missing() {
    let mut registry = DatasetRegistry::new();
    let err = registry.load_dir("/nonexistent/datasets").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[derive(Debug)]
struct StaticHandler;

impl DatasetHandler for StaticHandler {
    fn identity(&self) -> DatasetIdentity {
        DatasetIdentity::new("test", "static")
    }

    fn parse(&self, _data: &[u8]) -> crate::Result<RawTable> {
        Ok(RawTable::Records(vec![]))
    }

    fn normalize(&self, raw: RawTable) -> crate::Result<CanonicalTable> {
        Normalizer::new(vec![]).normalize(raw)
    }
}

#[test]
fn test_registry_custom_handler() {
    let mut registry = DatasetRegistry::new();
    registry.register(Arc::new(StaticHandler));

    let summaries = registry.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].format, "custom");
    assert!(registry.get(&DatasetIdentity::new("Test", "Static")).is_ok());
}
