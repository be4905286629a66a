//! Raw object reader

use super::stores::{map_store_error, BucketStores};
use crate::error::Result;
use crate::types::RawObjectRef;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use std::sync::Arc;
use tracing::debug;

/// Retrieves raw payload bytes from object storage
///
/// Implementations perform a single read: no retries, no side effects.
#[async_trait]
pub trait ObjectReader: Send + Sync {
    /// Read the whole object into memory
    async fn fetch(&self, object: &RawObjectRef) -> Result<Bytes>;
}

/// [`ObjectReader`] backed by [`BucketStores`]
#[derive(Debug, Clone)]
pub struct StoreReader {
    stores: Arc<BucketStores>,
}

impl StoreReader {
    pub fn new(stores: Arc<BucketStores>) -> Self {
        Self { stores }
    }
}

#[async_trait]
impl ObjectReader for StoreReader {
    async fn fetch(&self, object: &RawObjectRef) -> Result<Bytes> {
        let store = self.stores.store(&object.bucket)?;
        let path = ObjectPath::from(object.key.as_str());

        let result = store
            .get(&path)
            .await
            .map_err(|e| map_store_error(e, &object.bucket, &object.key))?;
        let data = result
            .bytes()
            .await
            .map_err(|e| map_store_error(e, &object.bucket, &object.key))?;

        debug!(object = %object, bytes = data.len(), "Fetched raw object");
        Ok(data)
    }
}
