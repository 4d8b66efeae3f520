use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    CollectionClusterInfoRequest, CollectionClusterInfoResponse, HealthCheckReply,
};
use qdrant_client::Qdrant;

use crate::config::ConnectionConfig;
use crate::error::{ReportError, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
/// The remote operations a shard report needs from Qdrant.
/// This allows for mocking the client in tests.
pub trait QdrantClientTrait: Send + Sync {
    /// Checks the health of the Qdrant server.
    async fn health_check(&self) -> Result<HealthCheckReply>;
    /// Lists collection names, in the order the server returns them.
    async fn list_collections(&self) -> Result<Vec<String>>;
    /// Gets shard placement and point counts for a collection.
    async fn collection_cluster_info(&self, collection_name: String) -> Result<CollectionClusterInfoResponse>;
}

#[async_trait]
impl QdrantClientTrait for Qdrant {
    async fn health_check(&self) -> Result<HealthCheckReply> {
        self.health_check().await.map_err(ReportError::Qdrant)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self.list_collections().await.map_err(ReportError::Qdrant)?;
        Ok(response.collections.into_iter().map(|c| c.name).collect())
    }

    async fn collection_cluster_info(&self, collection_name: String) -> Result<CollectionClusterInfoResponse> {
        let request = CollectionClusterInfoRequest { collection_name };
        self.collection_cluster_info(request).await.map_err(ReportError::Qdrant)
    }
}

/// Builds a Qdrant client for `config`.
///
/// `request_timeout` bounds each individual RPC; the overall run budget is
/// enforced separately by the report generator. The client's version probe is
/// skipped: it issues an extra health check and prints to stdout. The returned
/// handle closes its channels when dropped.
pub fn connect(config: &ConnectionConfig, request_timeout: Duration) -> Result<Qdrant> {
    let url = config.url();
    tracing::debug!("Initializing Qdrant client for {}", url);

    Qdrant::from_url(&url)
        .api_key(config.api_key.clone())
        .timeout(request_timeout)
        .connect_timeout(request_timeout)
        .skip_compatibility_check()
        .build()
        .map_err(|source| ReportError::Connection { url, source })
}
