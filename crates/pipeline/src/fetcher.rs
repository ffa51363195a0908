//! Upstream fetch seam.
//!
//! The processor talks to the upstream through [`DataFetcher`] so behaviour
//! tests can count and script upstream calls without a network. The
//! production binding is [`OverpassClient`].

use async_trait::async_trait;

use mapwatch_core::error::JobError;
use mapwatch_overpass::OverpassClient;

/// One bounded upstream call per invocation, every outcome classified.
///
/// Returns the parsed JSON body; schema validation happens in the processor.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<serde_json::Value, JobError>;
}

#[async_trait]
impl DataFetcher for OverpassClient {
    async fn fetch(&self, query: &str) -> Result<serde_json::Value, JobError> {
        OverpassClient::fetch(self, query).await
    }
}
