//! Raw payload parsers
//!
//! Supports: JSON record arrays, spreadsheet workbooks with a two-row header
//!
//! # Overview
//!
//! Each parser turns the raw bytes of one payload into a [`RawTable`].
//! Nothing is typed or flattened here: nested JSON stays nested and
//! spreadsheet cells stay untyped until the normalizer runs.

mod records;
mod sheet;
mod types;

pub use records::RecordArrayParser;
pub use sheet::{sheet_from_grid, SpreadsheetParser};
pub use types::{HeaderKey, RawParser, RawTable, SheetTable};
