//! Wide-to-long reshape of two-level spreadsheet headers

use crate::decode::SheetTable;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

fn default_date_column() -> String {
    "Date".to_string()
}

/// How a grouped sheet is unstacked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReshapeSpec {
    /// Inner labels of the ungrouped columns identifying a row, in output order
    pub identity: Vec<String>,

    /// Output column receiving each group's outer label
    #[serde(default = "default_date_column")]
    pub date_column: String,
}

impl ReshapeSpec {
    pub fn new(identity: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            identity: identity.into_iter().map(Into::into).collect(),
            date_column: default_date_column(),
        }
    }

    #[must_use]
    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = name.into();
        self
    }
}

/// One outer header group and the sheet positions of its inner columns
struct Group<'a> {
    label: &'a str,
    members: Vec<(&'a str, usize)>,
}

fn is_blank(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Unstack a sheet into one record per (source row, outer group)
///
/// Each record holds the identity cells, the group's outer label under
/// `date_column` and the group's cells keyed by inner label.
pub fn unstack(sheet: &SheetTable, spec: &ReshapeSpec) -> Result<Vec<JsonObject>> {
    let columns = sheet.columns();

    let identity = spec
        .identity
        .iter()
        .map(|name| {
            columns
                .iter()
                .position(|key| !key.has_outer() && key.inner == *name)
                .map(|idx| (name.as_str(), idx))
                .ok_or_else(|| {
                    Error::malformed(format!("Identity column '{name}' not found in sheet header"))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut groups: Vec<Group<'_>> = Vec::new();
    for (idx, key) in columns.iter().enumerate() {
        if !key.has_outer() || key.inner.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|g| g.label == key.outer) {
            Some(group) => group.members.push((key.inner.as_str(), idx)),
            None => groups.push(Group {
                label: key.outer.as_str(),
                members: vec![(key.inner.as_str(), idx)],
            }),
        }
    }

    let Some(first) = groups.first() else {
        return Err(Error::malformed("Sheet has no grouped columns to unstack"));
    };

    let expected: BTreeSet<&str> = first.members.iter().map(|(inner, _)| *inner).collect();
    for group in &groups {
        let labels: BTreeSet<&str> = group.members.iter().map(|(inner, _)| *inner).collect();
        if labels.len() != group.members.len() {
            return Err(Error::malformed(format!(
                "Group '{}' repeats an inner label",
                group.label
            )));
        }
        if labels != expected {
            return Err(Error::malformed(format!(
                "Group '{}' has inner labels {labels:?}, expected {expected:?}",
                group.label
            )));
        }
    }

    if let Some(clash) = expected
        .iter()
        .find(|inner| **inner == spec.date_column || spec.identity.iter().any(|id| id == *inner))
    {
        return Err(Error::malformed(format!(
            "Inner label '{clash}' collides with an identity or date column"
        )));
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in sheet.rows() {
        if identity.iter().all(|(_, idx)| is_blank(&row[*idx])) {
            skipped += 1;
            continue;
        }

        for group in &groups {
            if group.members.iter().all(|(_, idx)| is_blank(&row[*idx])) {
                continue;
            }

            let mut record = JsonObject::new();
            for (name, idx) in &identity {
                record.insert((*name).to_string(), row[*idx].clone());
            }
            record.insert(
                spec.date_column.clone(),
                JsonValue::String(group.label.to_string()),
            );
            for (inner, idx) in &group.members {
                record.insert((*inner).to_string(), row[*idx].clone());
            }
            records.push(record);
        }
    }

    debug!(
        groups = groups.len(),
        rows = sheet.num_rows(),
        skipped,
        records = records.len(),
        "Unstacked sheet"
    );

    Ok(records)
}
