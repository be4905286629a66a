//! Overwrite-mode lake publishing

use super::catalog::Catalog;
use super::writer::{encode_parquet, ParquetWriterConfig};
use crate::error::{Error, Result};
use crate::normalize::CanonicalTable;
use crate::storage::BucketStores;
use crate::types::LakeTableRef;
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::ObjectMeta;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// File name of the single data object written per table
pub const PART_FILE: &str = "part-00000.parquet";

/// Outcome of a successful publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    /// Full location of the data object
    pub location: String,
    pub rows_written: usize,
    pub bytes_written: usize,
    /// Stale objects removed from the table prefix
    pub objects_removed: usize,
}

/// Writes a canonical table to the lake, replacing any previous version
#[async_trait]
pub trait LakePublisher: Send + Sync {
    async fn publish(&self, table: CanonicalTable, target: &LakeTableRef) -> Result<PublishReceipt>;
}

/// [`LakePublisher`] writing Parquet through `object_store`
pub struct ObjectStoreLake {
    stores: Arc<BucketStores>,
    catalog: Arc<dyn Catalog>,
    config: ParquetWriterConfig,
}

impl ObjectStoreLake {
    pub fn new(stores: Arc<BucketStores>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            stores,
            catalog,
            config: ParquetWriterConfig::default(),
        }
    }

    #[must_use]
    pub fn with_writer_config(mut self, config: ParquetWriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Object key of the data file for a table
    pub fn part_key(target: &LakeTableRef) -> String {
        format!("{}/{PART_FILE}", target.prefix.trim_end_matches('/'))
    }
}

#[async_trait]
impl LakePublisher for ObjectStoreLake {
    async fn publish(&self, table: CanonicalTable, target: &LakeTableRef) -> Result<PublishReceipt> {
        let location = target.path();
        let fail = |e: Error| match e {
            Error::PublishFailure { .. } => e,
            other => Error::publish(&location, other.to_string()),
        };

        let rows = table.num_rows();
        let batch = table.to_record_batch().map_err(fail)?;
        drop(table);

        let data = encode_parquet(&batch, &self.config).map_err(fail)?;
        let bytes_written = data.len();

        let store = self.stores.store(&target.bucket).map_err(fail)?;
        let part = ObjectPath::from(Self::part_key(target));

        store
            .put(&part, data.into())
            .await
            .map_err(|e| Error::publish(&location, format!("write {part}: {e}")))?;
        debug!(object = %part, bytes = bytes_written, "Wrote data object");

        let prefix = ObjectPath::from(target.prefix.trim_end_matches('/'));
        let existing: Vec<ObjectMeta> = store
            .list(Some(&prefix))
            .try_collect()
            .await
            .map_err(|e| Error::publish(&location, format!("list {prefix}: {e}")))?;

        let mut objects_removed = 0;
        for meta in existing.into_iter().filter(|m| m.location != part) {
            store
                .delete(&meta.location)
                .await
                .map_err(|e| Error::publish(&location, format!("delete {}: {e}", meta.location)))?;
            debug!(object = %meta.location, "Removed stale object");
            objects_removed += 1;
        }

        self.catalog
            .register_table(target, batch.schema().as_ref())
            .await
            .map_err(fail)?;

        info!(
            location = %location,
            rows,
            bytes = bytes_written,
            removed = objects_removed,
            "Published table"
        );

        Ok(PublishReceipt {
            location: format!("s3://{}/{part}", target.bucket),
            rows_written: rows,
            bytes_written,
            objects_removed,
        })
    }
}
