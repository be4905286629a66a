//! Bucket to object store resolution (S3, local filesystem, in-memory)

use crate::config::{StorageBackend, StorageSettings};
use crate::error::{Error, Result};
use crate::types::RawObjectRef;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Resolves bucket names to object store handles
///
/// Handles are built lazily on first use and cached for the lifetime of
/// this value. The cache is what lets the in-memory backend hand the same
/// store to the reader and the publisher within one process.
pub struct BucketStores {
    settings: StorageSettings,
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl std::fmt::Debug for BucketStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketStores")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl BucketStores {
    /// Create a resolver for the configured backend
    pub fn new(settings: StorageSettings) -> Self {
        Self {
            settings,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Create a resolver backed by in-memory stores
    pub fn in_memory() -> Self {
        Self::new(StorageSettings {
            backend: StorageBackend::Memory,
            ..StorageSettings::default()
        })
    }

    /// Get the backend kind
    pub fn backend(&self) -> StorageBackend {
        self.settings.backend
    }

    /// Get (or build) the store for a bucket
    pub fn store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        if bucket.is_empty() {
            return Err(Error::config("Bucket name must not be empty"));
        }

        let mut stores = self
            .stores
            .lock()
            .map_err(|_| Error::storage("Store cache lock poisoned"))?;

        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let store = self.build(bucket)?;
        stores.insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }

    /// Write bytes to a bucket/key, replacing any existing object
    pub async fn put(&self, object: &RawObjectRef, data: Bytes) -> Result<()> {
        let store = self.store(&object.bucket)?;
        store
            .put(&ObjectPath::from(object.key.as_str()), data.into())
            .await
            .map_err(|e| map_store_error(e, &object.bucket, &object.key))?;
        Ok(())
    }

    fn build(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
        debug!(bucket, backend = ?self.settings.backend, "Building object store");

        match self.settings.backend {
            StorageBackend::S3 => {
                let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
                if let Some(endpoint) = &self.settings.endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                if let Some(region) = &self.settings.region {
                    builder = builder.with_region(region);
                }
                if self.settings.allow_http {
                    builder = builder.with_allow_http(true);
                }
                let store = builder
                    .build()
                    .map_err(|e| Error::config(format!("Failed to create S3 client: {e}")))?;
                Ok(Arc::new(store))
            }
            StorageBackend::Local => {
                let root = self.settings.local_root.as_ref().ok_or_else(|| {
                    Error::config("storage.local_root is required for the local backend")
                })?;
                let dir = root.join(bucket);
                std::fs::create_dir_all(&dir).map_err(|e| {
                    Error::config(format!("Failed to create directory {}: {e}", dir.display()))
                })?;
                let store = LocalFileSystem::new_with_prefix(&dir)
                    .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;
                Ok(Arc::new(store))
            }
            StorageBackend::Memory => Ok(Arc::new(InMemory::new())),
        }
    }
}

/// Translate an object store failure into the storage-layer taxonomy
pub fn map_store_error(err: object_store::Error, bucket: &str, key: &str) -> Error {
    match err {
        object_store::Error::NotFound { .. } => Error::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        object_store::Error::PermissionDenied { source, .. }
        | object_store::Error::Unauthenticated { source, .. } => Error::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: source.to_string(),
        },
        other => Error::storage(format!("s3://{bucket}/{key}: {other}")),
    }
}
