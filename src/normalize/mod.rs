//! Schema normalization
//!
//! Converts a loosely typed [`RawTable`] into a [`CanonicalTable`] whose
//! columns are exactly the declared [`ColumnSpec`]s.
//!
//! # Overview
//!
//! Spreadsheet input is first unstacked ([`unstack`]) so every source shape
//! arrives at the same record form. Each record is then projected onto the
//! declared columns, with nested lists flattened, values coerced and strings
//! trimmed. Any failing cell aborts the whole table.

mod coerce;
mod reshape;
mod spec;
mod table;

pub use reshape::{unstack, ReshapeSpec};
pub use spec::{ColumnSpec, ColumnType};
pub use table::{CanonicalTable, Cell};

use crate::decode::RawTable;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use tracing::debug;

/// Per-dataset normalization rules
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    columns: Vec<ColumnSpec>,
    reshape: Option<ReshapeSpec>,
}

impl Normalizer {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            reshape: None,
        }
    }

    #[must_use]
    pub fn with_reshape(mut self, reshape: ReshapeSpec) -> Self {
        self.reshape = Some(reshape);
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn reshape(&self) -> Option<&ReshapeSpec> {
        self.reshape.as_ref()
    }

    /// Normalize a raw table; fails on the first offending cell
    pub fn normalize(&self, raw: RawTable) -> Result<CanonicalTable> {
        let records = match raw {
            RawTable::Records(records) => records,
            RawTable::Sheet(sheet) => {
                let reshape = self.reshape.as_ref().ok_or_else(|| {
                    Error::malformed("Spreadsheet input requires a reshape declaration")
                })?;
                unstack(&sheet, reshape)?
            }
        };

        let rows = records
            .iter()
            .enumerate()
            .map(|(row, record)| self.normalize_record(row, record))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            rows = rows.len(),
            columns = self.columns.len(),
            "Normalized table"
        );

        Ok(CanonicalTable::new(self.columns.clone(), rows))
    }

    fn normalize_record(&self, row: usize, record: &JsonObject) -> Result<Vec<Cell>> {
        self.columns
            .iter()
            .map(|column| coerce::coerce_record(column, row, record))
            .collect()
    }
}
