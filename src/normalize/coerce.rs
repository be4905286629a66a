//! Per-cell projection, flattening, coercion and trimming

use super::spec::{ColumnSpec, ColumnType};
use super::table::Cell;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use chrono::{NaiveDate, NaiveDateTime};

/// Produce the typed cell for one declared column of one record
pub fn coerce_record(column: &ColumnSpec, row: usize, record: &JsonObject) -> Result<Cell> {
    let Some(value) = record.get(column.source_name()) else {
        return Err(Error::missing_column(column.source_name(), row));
    };

    if value.is_null() {
        return if column.column_type == ColumnType::Passthrough {
            Ok(Cell::Json(JsonValue::Null))
        } else if column.nullable {
            Ok(Cell::Null)
        } else {
            Err(Error::schema_violation(&column.name, row, "null value in non-nullable column"))
        };
    }

    coerce_value(column, value)
        .map(|cell| if column.trim { trim_cell(cell) } else { cell })
        .map_err(|message| Error::schema_violation(&column.name, row, message))
}

/// Coerce a non-null value to the column's type
fn coerce_value(column: &ColumnSpec, value: &JsonValue) -> std::result::Result<Cell, String> {
    match column.column_type {
        ColumnType::String => Ok(Cell::Utf8(match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })),
        ColumnType::Boolean => to_bool(value).map(Cell::Boolean),
        ColumnType::Integer => to_i64(value).map(Cell::Int64),
        ColumnType::Date => {
            let (text, format) = temporal_input(column, value)?;
            NaiveDate::parse_from_str(text, format)
                .map(Cell::Date)
                .map_err(|e| format!("{value} does not match date format '{format}': {e}"))
        }
        ColumnType::Timestamp => {
            let (text, format) = temporal_input(column, value)?;
            NaiveDateTime::parse_from_str(text, format)
                .map(Cell::Timestamp)
                .map_err(|e| format!("{value} does not match timestamp format '{format}': {e}"))
        }
        ColumnType::FlattenedList => flatten_items(value, &column.item_field).map(Cell::List),
        ColumnType::Passthrough => Ok(Cell::Json(value.clone())),
    }
}

fn temporal_input<'a>(
    column: &'a ColumnSpec,
    value: &'a JsonValue,
) -> std::result::Result<(&'a str, &'a str), String> {
    let format = column
        .format
        .as_deref()
        .ok_or_else(|| format!("no format declared for {} column", column.column_type))?;
    let text = value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {value}"))?;
    Ok((text, format))
}

fn to_bool(value: &JsonValue) -> std::result::Result<bool, String> {
    match value {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(format!("{n} is not a boolean")),
        },
        JsonValue::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "0" => Ok(false),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        other => Err(format!("{other} is not a boolean")),
    }
}

fn to_i64(value: &JsonValue) -> std::result::Result<i64, String> {
    match value {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                #[allow(clippy::cast_precision_loss)]
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(format!("{n} is not an integer")),
            }
        }
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{s}' is not an integer")),
        other => Err(format!("{other} is not an integer")),
    }
}

/// Reduce a list of sub-records to the ordered values of one field
fn flatten_items(value: &JsonValue, field: &str) -> std::result::Result<Vec<String>, String> {
    let JsonValue::Array(items) = value else {
        return Err(format!("expected a list, got {value}"));
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.get(field)
                .and_then(JsonValue::as_str)
                .map(str::to_string)
                .ok_or_else(|| format!("item {idx} has no string field '{field}'"))
        })
        .collect()
}

fn trim_cell(cell: Cell) -> Cell {
    match cell {
        Cell::Utf8(s) => Cell::Utf8(s.trim().to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(true), true)]
    #[test_case(json!(false), false)]
    #[test_case(json!("TRUE"), true)]
    #[test_case(json!(" no "), false)]
    #[test_case(json!("y"), true)]
    #[test_case(json!("F"), false)]
    #[test_case(json!(1), true)]
    #[test_case(json!(0), false)]
    fn test_to_bool_accepts(value: JsonValue, expected: bool) {
        assert_eq!(to_bool(&value), Ok(expected));
    }

    #[test_case(json!("maybe"))]
    #[test_case(json!(2))]
    #[test_case(json!(0.5))]
    #[test_case(json!([true]))]
    fn test_to_bool_rejects(value: JsonValue) {
        assert!(to_bool(&value).is_err());
    }

    #[test_case(json!(3), 3)]
    #[test_case(json!(-12), -12)]
    #[test_case(json!(42.0), 42)]
    #[test_case(json!(" 17 "), 17)]
    #[test_case(json!("+5"), 5)]
    fn test_to_i64_accepts(value: JsonValue, expected: i64) {
        assert_eq!(to_i64(&value), Ok(expected));
    }

    #[test_case(json!("not-a-number"))]
    #[test_case(json!(1.5))]
    #[test_case(json!("1.0"))]
    #[test_case(json!(true))]
    #[test_case(json!(1e300))]
    fn test_to_i64_rejects(value: JsonValue) {
        assert!(to_i64(&value).is_err());
    }

    #[test]
    fn test_flatten_items_missing_field() {
        let err = flatten_items(&json!([{"name": "a"}, {"id": 2}]), "name").unwrap_err();
        assert!(err.contains("item 1"));
    }
}
