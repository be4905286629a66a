//! Raw table types and the parser trait

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Two-level spreadsheet column label
///
/// A blank `outer` label marks a column that sits outside every outer
/// header group (row identifiers, preamble and metadata columns).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HeaderKey {
    pub outer: String,
    pub inner: String,
}

impl HeaderKey {
    pub fn new(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        Self {
            outer: outer.into(),
            inner: inner.into(),
        }
    }

    /// Column outside any outer header group
    pub fn unnamed(inner: impl Into<String>) -> Self {
        Self::new("", inner)
    }

    pub fn has_outer(&self) -> bool {
        !self.outer.is_empty()
    }
}

impl std::fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.outer.is_empty() {
            write!(f, "({})", self.inner)
        } else {
            write!(f, "({}, {})", self.outer, self.inner)
        }
    }
}

/// Spreadsheet data addressed by [`HeaderKey`] columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetTable {
    columns: Vec<HeaderKey>,
    rows: Vec<Vec<JsonValue>>,
}

impl SheetTable {
    /// Create a table; every row must have one cell per column
    pub fn new(columns: Vec<HeaderKey>, rows: Vec<Vec<JsonValue>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(Error::malformed(format!(
                "Sheet row {idx} has {} cells, expected {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[HeaderKey] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<JsonValue>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Parsed raw payload, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawTable {
    /// One JSON object per source record, nested structure preserved
    Records(Vec<JsonObject>),
    /// Spreadsheet cells under a two-level header
    Sheet(SheetTable),
}

impl RawTable {
    pub fn num_rows(&self) -> usize {
        match self {
            RawTable::Records(records) => records.len(),
            RawTable::Sheet(sheet) => sheet.num_rows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }
}

/// Deserializes raw payload bytes into a [`RawTable`]
pub trait RawParser: Send + Sync {
    fn parse(&self, data: &[u8]) -> Result<RawTable>;
}
