//! Table catalog registration

use crate::error::{Error, Result};
use crate::storage::BucketStores;
use crate::types::LakeTableRef;
use arrow::datatypes::Schema;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use object_store::path::Path as ObjectPath;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Registers (or re-registers) a published table
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn register_table(&self, table: &LakeTableRef, schema: &Schema) -> Result<()>;
}

/// Column entry of a table manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
}

/// Catalog record of one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableManifest {
    pub database: String,
    pub table: String,
    pub location: String,
    pub format: String,
    pub columns: Vec<ManifestColumn>,
    pub updated_at: String,
}

impl TableManifest {
    pub fn new(table: &LakeTableRef, schema: &Schema) -> Self {
        Self {
            database: table.database.clone(),
            table: table.table.clone(),
            location: table.path(),
            format: "parquet".to_string(),
            columns: schema
                .fields()
                .iter()
                .map(|f| ManifestColumn {
                    name: f.name().clone(),
                    data_type: f.data_type().to_string(),
                    nullable: f.is_nullable(),
                })
                .collect(),
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Object key of the manifest inside the lake bucket
    pub fn key_for(table: &LakeTableRef) -> String {
        format!("_catalog/{}/{}.json", table.database, table.table)
    }
}

/// Catalog kept as JSON manifests in the lake bucket itself
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    stores: Arc<BucketStores>,
}

impl ManifestCatalog {
    pub fn new(stores: Arc<BucketStores>) -> Self {
        Self { stores }
    }
}

#[async_trait]
impl Catalog for ManifestCatalog {
    async fn register_table(&self, table: &LakeTableRef, schema: &Schema) -> Result<()> {
        let key = TableManifest::key_for(table);
        let manifest = TableManifest::new(table, schema);
        let body = serde_json::to_vec_pretty(&manifest)?;

        let store = self.stores.store(&table.bucket)?;
        store
            .put(&ObjectPath::from(key.as_str()), Bytes::from(body).into())
            .await
            .map_err(|e| Error::publish(format!("s3://{}/{key}", table.bucket), e.to_string()))?;

        debug!(
            database = %table.database,
            table = %table.table,
            columns = manifest.columns.len(),
            "Registered catalog table"
        );
        Ok(())
    }
}
