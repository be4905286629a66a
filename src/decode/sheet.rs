//! Spreadsheet parser with a two-row header

use super::types::{HeaderKey, RawParser, RawTable, SheetTable};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDateTime, Timelike};
use std::io::Cursor;
use tracing::debug;

/// Parses one sheet of a workbook (xlsx, xls, xlsb, ods)
///
/// `header_rows` are absolute, 0-based sheet row indices: the first is the
/// outer header, the second the inner header. Data starts on the row after
/// the inner header.
#[derive(Debug, Clone)]
pub struct SpreadsheetParser {
    sheet: String,
    header_rows: [usize; 2],
}

impl SpreadsheetParser {
    pub fn new(sheet: impl Into<String>, header_rows: [usize; 2]) -> Self {
        Self {
            sheet: sheet.into(),
            header_rows,
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// Read the selected sheet into a dense grid of absolute cell positions
    fn read_grid(&self, data: &[u8]) -> Result<Vec<Vec<JsonValue>>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))
            .map_err(|e| Error::malformed(format!("Failed to open workbook: {e}")))?;

        let names = workbook.sheet_names();
        if !names.iter().any(|name| name == &self.sheet) {
            return Err(Error::malformed(format!(
                "Sheet '{}' not found (available: {})",
                self.sheet,
                names.join(", ")
            )));
        }

        let range = workbook
            .worksheet_range(&self.sheet)
            .map_err(|e| Error::malformed(format!("Failed to read sheet '{}': {e}", self.sheet)))?;

        let Some((last_row, last_col)) = range.end() else {
            return Ok(Vec::new());
        };

        debug!(
            sheet = %self.sheet,
            rows = last_row + 1,
            cols = last_col + 1,
            "Read worksheet"
        );

        Ok((0..=last_row)
            .map(|row| {
                (0..=last_col)
                    .map(|col| range.get_value((row, col)).map_or(JsonValue::Null, cell_to_json))
                    .collect()
            })
            .collect())
    }
}

impl RawParser for SpreadsheetParser {
    fn parse(&self, data: &[u8]) -> Result<RawTable> {
        let grid = self.read_grid(data)?;
        Ok(RawTable::Sheet(sheet_from_grid(grid, self.header_rows)?))
    }
}

/// Build a [`SheetTable`] from a grid using two header rows
///
/// Outer labels are forward-filled across blank cells once the first
/// non-blank outer label has been seen, mirroring merged header cells.
pub fn sheet_from_grid(grid: Vec<Vec<JsonValue>>, header_rows: [usize; 2]) -> Result<SheetTable> {
    let [outer_row, inner_row] = header_rows;
    if inner_row <= outer_row {
        return Err(Error::malformed(format!(
            "Inner header row {inner_row} must come after outer header row {outer_row}"
        )));
    }
    if grid.len() <= inner_row {
        return Err(Error::malformed(format!(
            "Sheet has {} rows, header needs rows {outer_row} and {inner_row}",
            grid.len()
        )));
    }

    let width = grid.iter().map(Vec::len).max().unwrap_or(0);

    let mut columns = Vec::with_capacity(width);
    let mut last_outer: Option<String> = None;
    for col in 0..width {
        let outer = header_label(grid[outer_row].get(col));
        let inner = header_label(grid[inner_row].get(col));

        let outer = if outer.is_empty() {
            last_outer.clone().unwrap_or_default()
        } else {
            last_outer = Some(outer.clone());
            outer
        };
        columns.push(HeaderKey { outer, inner });
    }

    let rows = grid
        .into_iter()
        .skip(inner_row + 1)
        .map(|mut row| {
            row.resize(width, JsonValue::Null);
            row
        })
        .collect();

    SheetTable::new(columns, rows)
}

/// Render a header cell as a trimmed label
fn header_label(cell: Option<&JsonValue>) -> String {
    match cell {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(JsonValue::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Convert a workbook cell into an untyped JSON value
fn cell_to_json(cell: &Data) -> JsonValue {
    match cell {
        Data::Empty | Data::Error(_) => JsonValue::Null,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            JsonValue::String(s.clone())
        }
        Data::Float(f) => serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Data::Int(i) => JsonValue::from(*i),
        Data::Bool(b) => JsonValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(JsonValue::Null, |dt| JsonValue::String(format_cell_datetime(dt))),
    }
}

/// Dates without a time of day render as `YYYY-MM-DD`
fn format_cell_datetime(dt: NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_to_json() {
        assert_eq!(cell_to_json(&Data::Empty), JsonValue::Null);
        assert_eq!(cell_to_json(&Data::String("x".into())), json!("x"));
        assert_eq!(cell_to_json(&Data::Float(12.0)), json!(12.0));
        assert_eq!(cell_to_json(&Data::Int(7)), json!(7));
        assert_eq!(cell_to_json(&Data::Bool(true)), json!(true));
        assert_eq!(
            cell_to_json(&Data::Error(calamine::CellErrorType::NA)),
            JsonValue::Null
        );
    }

    #[test]
    fn test_format_cell_datetime() {
        let midnight = chrono::NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_cell_datetime(midnight), "2023-01-02");

        let afternoon = midnight.with_hour(15).unwrap();
        assert_eq!(format_cell_datetime(afternoon), "2023-01-02T15:00:00");
    }

    #[test]
    fn test_header_label() {
        assert_eq!(header_label(None), "");
        assert_eq!(header_label(Some(&json!("  Code "))), "Code");
        assert_eq!(header_label(Some(&json!(2023.0))), "2023");
        assert_eq!(header_label(Some(&json!(1.5))), "1.5");
    }
}
