//! Column declarations
//!
//! A dataset's canonical schema is an ordered list of [`ColumnSpec`]s,
//! hand-written in its definition file.

use arrow::datatypes::{DataType, Field, TimeUnit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Semantic type of an output column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Text, copied as-is
    String,
    /// true/false
    Boolean,
    /// Base-10 signed 64-bit integer
    Integer,
    /// Calendar date, parsed with `format`
    Date,
    /// Date and time without zone, parsed with `format`
    Timestamp,
    /// List of sub-records reduced to one string field each
    FlattenedList,
    /// Value kept as it appears in the source
    Passthrough,
}

impl ColumnType {
    /// Arrow type of the column; `None` when inferred from the data
    pub fn data_type(self) -> Option<DataType> {
        match self {
            ColumnType::String => Some(DataType::Utf8),
            ColumnType::Boolean => Some(DataType::Boolean),
            ColumnType::Integer => Some(DataType::Int64),
            ColumnType::Date => Some(DataType::Date32),
            ColumnType::Timestamp => Some(DataType::Timestamp(TimeUnit::Microsecond, None)),
            ColumnType::FlattenedList => Some(DataType::List(Arc::new(Field::new(
                "item",
                DataType::Utf8,
                true,
            )))),
            ColumnType::Passthrough => None,
        }
    }

    /// Whether a chrono format string is required
    pub fn needs_format(self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Timestamp)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamp",
            ColumnType::FlattenedList => "flattened_list",
            ColumnType::Passthrough => "passthrough",
        };
        f.write_str(name)
    }
}

fn default_item_field() -> String {
    "name".to_string()
}

/// Declaration of one output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Canonical (output) column name
    pub name: String,

    /// Raw column name when it differs from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// chrono format string for date/timestamp columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Strip leading/trailing whitespace after coercion
    #[serde(default)]
    pub trim: bool,

    /// Accept nulls present in the source
    #[serde(default)]
    pub nullable: bool,

    /// Sub-record field kept by flattened_list columns
    #[serde(default = "default_item_field")]
    pub item_field: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            source: None,
            column_type,
            format: None,
            trim: false,
            nullable: false,
            item_field: default_item_field(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::String)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub fn date(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Date).with_format(format)
    }

    pub fn timestamp(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Timestamp).with_format(format)
    }

    pub fn flattened_list(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::FlattenedList)
    }

    pub fn passthrough(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Passthrough)
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_item_field(mut self, field: impl Into<String>) -> Self {
        self.item_field = field.into();
        self
    }

    #[must_use]
    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Name of the raw column this one is read from
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    /// Whether source nulls are accepted
    pub fn accepts_null(&self) -> bool {
        self.nullable || self.column_type == ColumnType::Passthrough
    }

    /// Check the declaration is internally consistent
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("column name must not be empty".to_string());
        }
        if self.column_type.needs_format() && self.format.is_none() {
            return Err(format!(
                "column '{}' of type {} requires a format",
                self.name, self.column_type
            ));
        }
        if !self.column_type.needs_format() && self.format.is_some() {
            return Err(format!(
                "column '{}' of type {} does not take a format",
                self.name, self.column_type
            ));
        }
        if self.trim && self.column_type != ColumnType::String {
            return Err(format!(
                "column '{}': trim applies to string columns only",
                self.name
            ));
        }
        if self.column_type == ColumnType::FlattenedList && self.item_field.is_empty() {
            return Err(format!("column '{}': item_field must not be empty", self.name));
        }
        Ok(())
    }
}
