//! Common types used throughout lake-loader
//!
//! Storage references, dataset identity and the invocation payloads exchanged
//! with the workflow orchestrator.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Storage References
// ============================================================================

/// Location of a raw payload in object storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObjectRef {
    pub bucket: String,
    pub key: String,
}

impl RawObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for RawObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Identity of a logical dataset, e.g. `ea/floods`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetIdentity {
    pub provider: String,
    pub name: String,
}

impl DatasetIdentity {
    pub fn new(provider: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            name: name.into(),
        }
    }

    /// Case-normalized identity used for registry lookups and lake naming
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            provider: self.provider.to_lowercase(),
            name: self.name.to_lowercase(),
        }
    }

    /// Catalog table name: `{provider}_{name}`, lower-cased
    pub fn table_name(&self) -> String {
        let id = self.normalized();
        format!("{}_{}", id.provider, id.name)
    }

    /// Lake object prefix: `{provider}/{name}.parquet`, lower-cased
    pub fn lake_prefix(&self) -> String {
        let id = self.normalized();
        format!("{}/{}.parquet", id.provider, id.name)
    }
}

impl std::fmt::Display for DatasetIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.name)
    }
}

/// Destination of a published table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LakeTableRef {
    /// Lake bucket
    pub bucket: String,
    /// Object prefix holding the table's data files
    pub prefix: String,
    /// Catalog database
    pub database: String,
    /// Catalog table
    pub table: String,
}

impl LakeTableRef {
    /// Derive the table location for a dataset
    pub fn for_dataset(
        identity: &DatasetIdentity,
        bucket: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: identity.lake_prefix(),
            database: database.into(),
            table: identity.table_name(),
        }
    }

    /// Full table location, e.g. `s3://lake/ea/floods.parquet`
    pub fn path(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix)
    }
}

// ============================================================================
// Invocation Payloads
// ============================================================================

/// Input handed to the transform-load stage by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationInput {
    pub raw_bucket: String,
    pub raw_key: String,
    pub dataset_provider: String,
    pub dataset_name: String,
    pub data_lake_bucket: String,
    pub data_lake_database_name: String,
}

impl InvocationInput {
    pub fn raw_ref(&self) -> RawObjectRef {
        RawObjectRef::new(&self.raw_bucket, &self.raw_key)
    }

    pub fn identity(&self) -> DatasetIdentity {
        DatasetIdentity::new(&self.dataset_provider, &self.dataset_name)
    }

    pub fn lake_table(&self) -> LakeTableRef {
        LakeTableRef::for_dataset(
            &self.identity(),
            &self.data_lake_bucket,
            &self.data_lake_database_name,
        )
    }

    /// Parse an invocation event, accepting the bare input or a state
    /// machine task event wrapping it under `Payload`
    pub fn from_event(event: JsonValue) -> crate::Result<Self> {
        let event = match event {
            JsonValue::Object(mut obj) if obj.contains_key("Payload") => obj
                .remove("Payload")
                .unwrap_or(JsonValue::Null),
            other => other,
        };
        serde_json::from_value(event)
            .map_err(|e| crate::Error::config(format!("Invalid invocation input: {e}")))
    }
}

/// Output reported back to the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationOutput {
    pub rows_processed: usize,
}

/// Input of the raw fetch stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub url: String,
    pub dataset_provider: String,
    pub dataset_name: String,
    /// File extension of the stored payload (`json`, `xlsx`, ...)
    pub dataset_type: String,
    pub raw_bucket: String,
    pub data_lake_bucket: String,
    pub data_lake_database_name: String,
}
