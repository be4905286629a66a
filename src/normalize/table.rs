//! Canonical (fully typed) table

use super::spec::{ColumnSpec, ColumnType};
use crate::error::{Error, Result};
use crate::output::json_array;
use crate::types::{JsonObject, JsonValue};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Int64Array, ListBuilder, StringArray, StringBuilder,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Source-provided null (nullable and passthrough columns only)
    Null,
    Utf8(String),
    Boolean(bool),
    Int64(i64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    List(Vec<String>),
    Json(JsonValue),
}

impl Cell {
    /// JSON rendering used for previews
    pub fn to_json(&self) -> JsonValue {
        match self {
            Cell::Null => JsonValue::Null,
            Cell::Utf8(s) => JsonValue::String(s.clone()),
            Cell::Boolean(b) => JsonValue::Bool(*b),
            Cell::Int64(i) => JsonValue::from(*i),
            Cell::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
            Cell::Timestamp(ts) => JsonValue::String(ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Cell::List(items) => JsonValue::from(items.clone()),
            Cell::Json(v) => v.clone(),
        }
    }
}

/// Output of the normalizer: rows conforming to the declared columns
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    columns: Vec<ColumnSpec>,
    rows: Vec<Vec<Cell>>,
}

impl CanonicalTable {
    pub(crate) fn new(columns: Vec<ColumnSpec>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell at a row for a named column
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Rows rendered as JSON objects, in column order
    pub fn to_json_rows(&self) -> Vec<JsonObject> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| (col.name.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }

    /// Convert to an Arrow RecordBatch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays = Vec::with_capacity(self.columns.len());

        for (idx, column) in self.columns.iter().enumerate() {
            let cells: Vec<&Cell> = self.rows.iter().map(|row| &row[idx]).collect();
            let array = build_column(column, &cells)?;
            fields.push(Field::new(
                &column.name,
                array.data_type().clone(),
                column.accepts_null(),
            ));
            arrays.push(array);
        }

        let schema: SchemaRef = Arc::new(Schema::new(fields));
        let options = RecordBatchOptions::new().with_row_count(Some(self.rows.len()));
        RecordBatch::try_new_with_options(schema, arrays, &options).map_err(Error::from)
    }
}

fn mismatch(column: &ColumnSpec, cell: &Cell) -> Error {
    Error::Other(format!(
        "Cell {cell:?} does not match {} column '{}'",
        column.column_type, column.name
    ))
}

/// Build the Arrow array for one column
fn build_column(column: &ColumnSpec, cells: &[&Cell]) -> Result<ArrayRef> {
    match column.column_type {
        ColumnType::String => {
            let values = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Utf8(s) => Ok(Some(s.as_str())),
                    Cell::Null => Ok(None),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(StringArray::from(values)))
        }

        ColumnType::Boolean => {
            let values = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Boolean(b) => Ok(Some(*b)),
                    Cell::Null => Ok(None),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(BooleanArray::from(values)))
        }

        ColumnType::Integer => {
            let values = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Int64(i) => Ok(Some(*i)),
                    Cell::Null => Ok(None),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(Int64Array::from(values)))
        }

        ColumnType::Date => {
            let values = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Date(d) => Ok(Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)),
                    Cell::Null => Ok(None),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(Date32Array::from(values)))
        }

        ColumnType::Timestamp => {
            let values = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Timestamp(ts) => Ok(Some(ts.and_utc().timestamp_micros())),
                    Cell::Null => Ok(None),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(TimestampMicrosecondArray::from(values)))
        }

        ColumnType::FlattenedList => {
            let mut builder = ListBuilder::new(StringBuilder::new());
            for cell in cells {
                match cell {
                    Cell::List(items) => {
                        for item in items {
                            builder.values().append_value(item);
                        }
                        builder.append(true);
                    }
                    Cell::Null => builder.append(false),
                    other => return Err(mismatch(column, other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }

        ColumnType::Passthrough => {
            let values = cells
                .iter()
                .map(|cell| match cell {
                    Cell::Json(JsonValue::Null) | Cell::Null => Ok(None),
                    Cell::Json(v) => Ok(Some(v)),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Vec<Option<&JsonValue>>>>()?;
            json_array(&values)
        }
    }
}
