//! Component wiring shared by the CLI runner and the HTTP server

use crate::config::Settings;
use crate::dataset::DatasetRegistry;
use crate::error::Result;
use crate::fetch::RawFetcher;
use crate::output::{ManifestCatalog, ObjectStoreLake};
use crate::pipeline::Pipeline;
use crate::storage::{BucketStores, StoreReader};
use std::sync::Arc;
use tracing::debug;

/// Fully wired fetch and transform-load stages
#[derive(Debug, Clone)]
pub struct AppContext {
    stores: Arc<BucketStores>,
    pipeline: Pipeline,
    fetcher: RawFetcher,
}

impl AppContext {
    /// Wire components over an existing store resolver and registry
    pub fn new(
        stores: Arc<BucketStores>,
        registry: DatasetRegistry,
        settings: &Settings,
    ) -> Result<Self> {
        let catalog = Arc::new(ManifestCatalog::new(Arc::clone(&stores)));
        let publisher = ObjectStoreLake::new(Arc::clone(&stores), catalog)
            .with_writer_config(settings.output.writer_config());
        let pipeline = Pipeline::new(
            Arc::new(StoreReader::new(Arc::clone(&stores))),
            Arc::new(registry),
            Arc::new(publisher),
        );
        let fetcher = RawFetcher::new(Arc::clone(&stores), &settings.fetch)?;

        Ok(Self {
            stores,
            pipeline,
            fetcher,
        })
    }

    /// Wire components from settings alone
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut registry = DatasetRegistry::with_builtins()?;
        if let Some(dir) = &settings.datasets_dir {
            registry.load_dir(dir)?;
        }
        debug!(datasets = registry.len(), backend = ?settings.storage.backend, "Wiring components");

        let stores = Arc::new(BucketStores::new(settings.storage.clone()));
        Self::new(stores, registry, settings)
    }

    pub fn stores(&self) -> &Arc<BucketStores> {
        &self.stores
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn fetcher(&self) -> &RawFetcher {
        &self.fetcher
    }
}
