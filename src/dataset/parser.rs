//! YAML parser for dataset definitions
//!
//! Parses and validates dataset definition files.

use super::types::{DatasetDefinition, FormatSpec};
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Load a dataset definition from a YAML file
pub fn load_definition(path: impl AsRef<Path>) -> Result<DatasetDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read dataset file '{}': {e}",
            path.display()
        ))
    })?;
    load_definition_from_str(&content)
}

/// Load a dataset definition from a YAML string
pub fn load_definition_from_str(yaml: &str) -> Result<DatasetDefinition> {
    let def: DatasetDefinition = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse dataset YAML: {e}")))?;

    validate_definition(&def)?;
    Ok(def)
}

/// Validate a dataset definition
pub fn validate_definition(def: &DatasetDefinition) -> Result<()> {
    let id = def.identity().to_string();
    let invalid = |message: String| Error::definition(&id, message);

    if def.provider.trim().is_empty() || def.name.trim().is_empty() {
        return Err(invalid("provider and name cannot be empty".to_string()));
    }
    if def.provider.contains('/') || def.name.contains('/') {
        return Err(invalid("provider and name cannot contain '/'".to_string()));
    }

    if def.columns.is_empty() {
        return Err(invalid("at least one column is required".to_string()));
    }

    let mut names = HashSet::new();
    for column in &def.columns {
        column.validate().map_err(invalid)?;
        if !names.insert(column.name.as_str()) {
            return Err(invalid(format!("duplicate column '{}'", column.name)));
        }
    }

    match &def.format {
        FormatSpec::RecordArray { records_key } => {
            if records_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                return Err(invalid("records_key cannot be empty".to_string()));
            }
            if def.reshape.is_some() {
                return Err(invalid(
                    "reshape applies to spreadsheet formats only".to_string(),
                ));
            }
        }
        FormatSpec::Spreadsheet { sheet, header_rows } => {
            if sheet.is_empty() {
                return Err(invalid("sheet cannot be empty".to_string()));
            }
            if header_rows.len() != 2 || header_rows[0] >= header_rows[1] {
                return Err(invalid(format!(
                    "header_rows must be two ascending row indices, got {header_rows:?}"
                )));
            }
            let Some(reshape) = &def.reshape else {
                return Err(invalid(
                    "spreadsheet formats require a reshape block".to_string(),
                ));
            };
            if reshape.identity.is_empty() {
                return Err(invalid("reshape.identity cannot be empty".to_string()));
            }
            if reshape.date_column.is_empty() {
                return Err(invalid("reshape.date_column cannot be empty".to_string()));
            }
        }
    }

    Ok(())
}
