//! Dataset definition types (YAML schema)

use crate::normalize::{ColumnSpec, ReshapeSpec};
use crate::types::DatasetIdentity;
use serde::{Deserialize, Serialize};

/// Complete dataset definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    /// Publishing organisation, e.g. `ea`
    pub provider: String,

    /// Dataset name within the provider, e.g. `floods`
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Source URL the raw fetch stage usually downloads from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Raw payload format
    pub format: FormatSpec,

    /// Output columns, in order
    pub columns: Vec<ColumnSpec>,

    /// Wide-to-long reshape (spreadsheet formats)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reshape: Option<ReshapeSpec>,
}

impl DatasetDefinition {
    pub fn identity(&self) -> DatasetIdentity {
        DatasetIdentity::new(&self.provider, &self.name)
    }
}

/// Raw payload format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormatSpec {
    /// JSON document with an array of records
    RecordArray {
        /// Dotted path to the array; absent for a top-level array
        #[serde(default, skip_serializing_if = "Option::is_none")]
        records_key: Option<String>,
    },

    /// Workbook sheet with a two-row header
    Spreadsheet {
        sheet: String,
        /// Absolute, 0-based outer and inner header row indices
        header_rows: Vec<usize>,
    },
}

impl FormatSpec {
    /// File extension of raw payloads in this format
    pub fn extension(&self) -> &'static str {
        match self {
            FormatSpec::RecordArray { .. } => "json",
            FormatSpec::Spreadsheet { .. } => "xlsx",
        }
    }
}

/// Summary row for dataset listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub provider: String,
    pub name: String,
    pub format: String,
    pub columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&DatasetDefinition> for DatasetSummary {
    fn from(def: &DatasetDefinition) -> Self {
        let format = match &def.format {
            FormatSpec::RecordArray { .. } => "record_array",
            FormatSpec::Spreadsheet { .. } => "spreadsheet",
        };
        Self {
            provider: def.provider.clone(),
            name: def.name.clone(),
            format: format.to_string(),
            columns: def.columns.len(),
            description: def.description.clone(),
        }
    }
}
