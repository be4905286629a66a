//! Transform-load orchestration
//!
//! One invocation runs fetch → parse → normalize → publish for a single raw
//! object and reports the number of rows written. Stages run sequentially
//! and any failure is returned unchanged.

use crate::dataset::DatasetRegistry;
use crate::error::Result;
use crate::normalize::CanonicalTable;
use crate::output::LakePublisher;
use crate::storage::ObjectReader;
use crate::types::{InvocationInput, InvocationOutput};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Wires the reader, dataset handlers and publisher together
#[derive(Clone)]
pub struct Pipeline {
    reader: Arc<dyn ObjectReader>,
    registry: Arc<DatasetRegistry>,
    publisher: Arc<dyn LakePublisher>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        reader: Arc<dyn ObjectReader>,
        registry: Arc<DatasetRegistry>,
        publisher: Arc<dyn LakePublisher>,
    ) -> Self {
        Self {
            reader,
            registry,
            publisher,
        }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// Load one raw object into its lake table
    pub async fn run(&self, input: &InvocationInput) -> Result<InvocationOutput> {
        let start = Instant::now();
        let table = self.preview(input).await?;
        let target = input.lake_table();
        let rows = table.num_rows();

        let receipt = self.publisher.publish(table, &target).await?;
        debug!(location = %receipt.location, bytes = receipt.bytes_written, "Publish complete");

        info!(
            dataset = %input.identity(),
            rows,
            duration_ms = start.elapsed().as_millis() as u64,
            "Run complete"
        );
        Ok(InvocationOutput {
            rows_processed: rows,
        })
    }

    /// Fetch, parse and normalize without publishing
    pub async fn preview(&self, input: &InvocationInput) -> Result<CanonicalTable> {
        let identity = input.identity();
        let handler = self.registry.get(&identity)?;
        let object = input.raw_ref();

        info!(dataset = %identity, object = %object, "Fetching raw object");
        let data = self.reader.fetch(&object).await?;

        let raw = handler.parse(&data)?;
        info!(dataset = %identity, bytes = data.len(), records = raw.num_rows(), "Parsed raw payload");
        drop(data);

        let table = handler.normalize(raw)?;
        info!(dataset = %identity, rows = table.num_rows(), "Normalized table");
        Ok(table)
    }
}
