//! Raw fetch stage
//!
//! Downloads a source URL and stashes the unmodified bytes in the raw
//! bucket, returning the invocation input for the transform-load stage.

use crate::config::FetchSettings;
use crate::error::{Error, Result};
use crate::storage::BucketStores;
use crate::types::{FetchRequest, InvocationInput, RawObjectRef};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Longest response body excerpt kept in a fetch error
const BODY_EXCERPT_LEN: usize = 512;

/// Timestamp embedded in raw object keys
const KEY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// HTTP GET + raw bucket PUT
#[derive(Debug, Clone)]
pub struct RawFetcher {
    client: Client,
    stores: Arc<BucketStores>,
}

impl RawFetcher {
    pub fn new(stores: Arc<BucketStores>, settings: &FetchSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(&settings.user_agent)
            .build()?;
        Ok(Self { client, stores })
    }

    /// Raw object key for a payload fetched at `at`
    pub fn raw_key(request: &FetchRequest, at: DateTime<Utc>) -> String {
        format!(
            "{provider}/{name}/{name}-{ts}.{ext}",
            provider = request.dataset_provider,
            name = request.dataset_name,
            ts = at.format(KEY_TIMESTAMP_FORMAT),
            ext = request.dataset_type,
        )
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Result<InvocationInput> {
        self.fetch_at(request, Utc::now()).await
    }

    /// Fetch with an explicit timestamp for the raw key
    pub async fn fetch_at(
        &self,
        request: &FetchRequest,
        at: DateTime<Utc>,
    ) -> Result<InvocationInput> {
        if request.dataset_type.trim().is_empty() {
            return Err(Error::config("datasetType must not be empty"));
        }
        let url = Url::parse(&request.url)?;

        debug!(url = %url, "Requesting source");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
            return Err(Error::http_status(url.as_str(), status.as_u16(), excerpt));
        }
        let data = response.bytes().await?;

        let object = RawObjectRef::new(&request.raw_bucket, Self::raw_key(request, at));
        let size = data.len();
        self.stores.put(&object, data).await?;

        info!(url = %url, object = %object, bytes = size, "Stored raw payload");

        Ok(InvocationInput {
            raw_bucket: object.bucket,
            raw_key: object.key,
            dataset_provider: request.dataset_provider.clone(),
            dataset_name: request.dataset_name.clone(),
            data_lake_bucket: request.data_lake_bucket.clone(),
            data_lake_database_name: request.data_lake_database_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests;
