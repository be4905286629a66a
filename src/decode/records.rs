//! JSON record-array parser

use super::types::{RawParser, RawTable};
use crate::error::{Error, Result};
use crate::types::JsonValue;

/// Parses a JSON document holding an array of records
///
/// With a `records_key` the array is looked up by dotted path
/// (`barriers`, `data.items`); without one the document itself must be
/// an array.
#[derive(Debug, Clone, Default)]
pub struct RecordArrayParser {
    records_key: Option<String>,
}

impl RecordArrayParser {
    /// Parser for a top-level array document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser for an array stored under a key
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            records_key: Some(key.into()),
        }
    }

    pub fn records_key(&self) -> Option<&str> {
        self.records_key.as_deref()
    }
}

impl RawParser for RecordArrayParser {
    fn parse(&self, data: &[u8]) -> Result<RawTable> {
        let mut document: JsonValue = serde_json::from_slice(data)
            .map_err(|e| Error::malformed(format!("Failed to parse JSON: {e}")))?;

        let array = match &self.records_key {
            Some(key) => extract_path_mut(&mut document, key)
                .ok_or_else(|| Error::malformed(format!("Expected array key '{key}' is absent")))?
                .take(),
            None => document,
        };

        let JsonValue::Array(items) = array else {
            return Err(Error::malformed(format!(
                "Expected an array of records at '{}'",
                self.records_key.as_deref().unwrap_or("$")
            )));
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                JsonValue::Object(obj) => Ok(obj),
                other => Err(Error::malformed(format!(
                    "Record {idx} is not an object: {other}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawTable::Records(records))
    }
}

/// Walk a dotted path (`a.b.c`, optional `$.` prefix) through nested objects
fn extract_path_mut<'a>(value: &'a mut JsonValue, path: &str) -> Option<&'a mut JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    path.split('.')
        .try_fold(value, |current, part| current.get_mut(part))
}
