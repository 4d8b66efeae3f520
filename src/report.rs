//! Builds the per-shard point count report.
//!
//! A run is strictly sequential: health check, collection listing, then one
//! cluster info request per collection. Every call shares a single deadline
//! fixed when the [`ReportGenerator`] is created.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{timeout_at, Instant};

use crate::error::{ReportError, Result};
use crate::qdrant_client_trait::QdrantClientTrait;

/// Total time budget for one run, shared by every remote call.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(60);
/// Largest accepted run budget.
pub const MAX_RUN_TIMEOUT: Duration = Duration::from_secs(86_400);

/// Point count of one local shard of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardReport {
    /// Collection the shard belongs to.
    pub collection_name: String,
    /// Shard identifier within the collection.
    pub shard_id: u32,
    /// Number of points stored in the shard.
    pub points_count: u64,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Version string reported by the health check.
    pub version: String,
    /// One entry per local shard, in the order the server returned them.
    pub shards: Vec<ShardReport>,
}

/// Drives the remote calls for a single report run.
pub struct ReportGenerator<C>
where
    C: QdrantClientTrait + ?Sized,
{
    client: Arc<C>,
    deadline: Instant,
}

impl<C> ReportGenerator<C>
where
    C: QdrantClientTrait + ?Sized,
{
    /// Creates a generator whose deadline is `budget` from now.
    ///
    /// Budgets above [`MAX_RUN_TIMEOUT`] are clamped to it.
    pub fn new(client: Arc<C>, budget: Duration) -> Self {
        Self::with_deadline(client, Instant::now() + budget.min(MAX_RUN_TIMEOUT))
    }

    /// Creates a generator with an explicit deadline.
    pub fn with_deadline(client: Arc<C>, deadline: Instant) -> Self {
        Self { client, deadline }
    }

    /// The instant after which every remote call fails.
    pub(crate) fn deadline(&self) -> Instant {
        self.deadline
    }

    async fn within_deadline<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match timeout_at(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(ReportError::DeadlineExceeded { operation }),
        }
    }

    /// Runs the health check and returns the server version.
    pub async fn health_check(&self) -> Result<String> {
        let reply = self
            .within_deadline("health_check", self.client.health_check())
            .await
            .map_err(|e| ReportError::HealthCheck(Box::new(e)))?;
        tracing::info!("Qdrant version: {}", reply.version);
        Ok(reply.version)
    }

    /// Lists collection names.
    ///
    /// A failure here is logged and treated as an empty cluster; the run goes on.
    pub async fn list_collections(&self) -> Vec<String> {
        match self.within_deadline("list_collections", self.client.list_collections()).await {
            Ok(names) => {
                tracing::debug!("Found {} collections", names.len());
                names
            }
            Err(e) => {
                let err = ReportError::ListCollections(Box::new(e));
                tracing::warn!("{}", err);
                Vec::new()
            }
        }
    }

    /// Fetches the local shards of `collection_name`.
    pub async fn cluster_info(&self, collection_name: &str) -> Result<Vec<ShardReport>> {
        let info = self
            .within_deadline(
                "collection_cluster_info",
                self.client.collection_cluster_info(collection_name.to_string()),
            )
            .await
            .map_err(|e| ReportError::ClusterInfo {
                collection: collection_name.to_string(),
                source: Box::new(e),
            })?;

        tracing::debug!(
            "Collection '{}': {} local shards (peer {})",
            collection_name,
            info.local_shards.len(),
            info.peer_id
        );

        Ok(info
            .local_shards
            .into_iter()
            .map(|shard| ShardReport {
                collection_name: collection_name.to_string(),
                shard_id: shard.shard_id,
                points_count: shard.points_count,
            })
            .collect())
    }

    /// Performs the full run.
    ///
    /// Stops at the first fatal error, so no report is returned for a run
    /// that could not query every collection.
    pub async fn generate(&self) -> Result<Report> {
        let version = self.health_check().await?;
        let collections = self.list_collections().await;

        let mut shards = Vec::new();
        for collection_name in &collections {
            shards.extend(self.cluster_info(collection_name).await?);
        }

        Ok(Report { version, shards })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qdrant_client_trait::MockQdrantClientTrait;
    use async_trait::async_trait;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use qdrant_client::qdrant::{CollectionClusterInfoResponse, HealthCheckReply, LocalShardInfo};
    use qdrant_client::QdrantError;

    fn health_reply(version: &str) -> HealthCheckReply {
        HealthCheckReply {
            title: "qdrant - vector search engine".to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    fn cluster_info(shards: &[(u32, u64)]) -> CollectionClusterInfoResponse {
        CollectionClusterInfoResponse {
            peer_id: 1,
            shard_count: shards.len() as u64,
            local_shards: shards
                .iter()
                .map(|&(shard_id, points_count)| LocalShardInfo {
                    shard_id,
                    points_count,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn unavailable(message: &str) -> ReportError {
        ReportError::Qdrant(QdrantError::ResponseError {
            status: tonic::Status::unavailable(message),
        })
    }

    fn shard(collection_name: &str, shard_id: u32, points_count: u64) -> ShardReport {
        ShardReport {
            collection_name: collection_name.to_string(),
            shard_id,
            points_count,
        }
    }

    fn generator(mock: MockQdrantClientTrait) -> ReportGenerator<MockQdrantClientTrait> {
        ReportGenerator::new(Arc::new(mock), DEFAULT_RUN_TIMEOUT)
    }

    #[tokio::test]
    async fn test_generate_reports_shards_in_server_order() {
        let mut mock = MockQdrantClientTrait::new();
        let mut seq = Sequence::new();
        mock.expect_health_check()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(health_reply("1.13.2")));
        mock.expect_list_collections()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec!["docs".to_string(), "images".to_string()]));
        mock.expect_collection_cluster_info()
            .with(eq("docs".to_string()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(cluster_info(&[(0, 120)])));
        mock.expect_collection_cluster_info()
            .with(eq("images".to_string()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(cluster_info(&[(0, 5), (1, 7)])));

        let report = generator(mock).generate().await.unwrap();

        assert_eq!(report.version, "1.13.2");
        assert_eq!(
            report.shards,
            vec![shard("docs", 0, 120), shard("images", 0, 5), shard("images", 1, 7)]
        );
    }

    #[tokio::test]
    async fn test_points_count_passes_through_unchanged() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_health_check().returning(|| Ok(health_reply("1.13.2")));
        mock.expect_list_collections().returning(|| Ok(vec!["big".to_string()]));
        mock.expect_collection_cluster_info()
            .returning(|_| Ok(cluster_info(&[(3, u64::MAX), (4, 0)])));

        let report = generator(mock).generate().await.unwrap();

        assert_eq!(report.shards, vec![shard("big", 3, u64::MAX), shard("big", 4, 0)]);
    }

    #[tokio::test]
    async fn test_health_check_failure_is_fatal() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_health_check()
            .times(1)
            .returning(|| Err(unavailable("connection refused")));
        mock.expect_list_collections().times(0);
        mock.expect_collection_cluster_info().times(0);

        let err = generator(mock).generate().await.unwrap_err();

        assert!(matches!(err, ReportError::HealthCheck(_)), "unexpected error: {err:?}");
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("Could not get health"));
    }

    #[tokio::test]
    async fn test_list_collections_failure_yields_empty_report() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_health_check().times(1).returning(|| Ok(health_reply("1.13.2")));
        mock.expect_list_collections()
            .times(1)
            .returning(|| Err(unavailable("listing failed")));
        mock.expect_collection_cluster_info().times(0);

        let report = generator(mock).generate().await.unwrap();

        assert_eq!(report.version, "1.13.2");
        assert!(report.shards.is_empty());
    }

    #[tokio::test]
    async fn test_no_collections_yields_empty_report() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_health_check().returning(|| Ok(health_reply("1.13.2")));
        mock.expect_list_collections().returning(|| Ok(Vec::new()));
        mock.expect_collection_cluster_info().times(0);

        let report = generator(mock).generate().await.unwrap();

        assert!(report.shards.is_empty());
    }

    #[tokio::test]
    async fn test_cluster_info_failure_stops_the_run() {
        let mut mock = MockQdrantClientTrait::new();
        mock.expect_health_check().returning(|| Ok(health_reply("1.13.2")));
        mock.expect_list_collections().returning(|| {
            Ok(vec!["docs".to_string(), "broken".to_string(), "images".to_string()])
        });
        mock.expect_collection_cluster_info()
            .with(eq("docs".to_string()))
            .times(1)
            .returning(|_| Ok(cluster_info(&[(0, 120)])));
        mock.expect_collection_cluster_info()
            .with(eq("broken".to_string()))
            .times(1)
            .returning(|_| Err(unavailable("shard unavailable")));
        mock.expect_collection_cluster_info()
            .with(eq("images".to_string()))
            .times(0);

        let err = generator(mock).generate().await.unwrap_err();

        match &err {
            ReportError::ClusterInfo { collection, .. } => assert_eq!(collection, "broken"),
            other => panic!("expected cluster info error, got {other:?}"),
        }
        assert!(err.is_fatal());
    }

    struct StalledClient;

    #[async_trait]
    impl QdrantClientTrait for StalledClient {
        async fn health_check(&self) -> Result<HealthCheckReply> {
            Ok(health_reply("1.13.2"))
        }

        async fn list_collections(&self) -> Result<Vec<String>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(vec!["never".to_string()])
        }

        async fn collection_cluster_info(&self, _collection_name: String) -> Result<CollectionClusterInfoResponse> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(cluster_info(&[]))
        }
    }

    #[tokio::test]
    async fn test_deadline_applies_to_list_collections_as_non_fatal() {
        let generator = ReportGenerator::new(Arc::new(StalledClient), Duration::from_millis(50));

        let report = generator.generate().await.unwrap();

        assert!(report.shards.is_empty());
        assert!(Instant::now() >= generator.deadline());
    }

    #[test]
    fn test_oversized_budget_is_clamped() {
        let before = Instant::now();
        let generator = ReportGenerator::new(Arc::new(StalledClient), Duration::MAX);

        assert!(generator.deadline() <= Instant::now() + MAX_RUN_TIMEOUT);
        assert!(generator.deadline() >= before + MAX_RUN_TIMEOUT);
    }

    #[tokio::test]
    async fn test_deadline_applies_to_cluster_info_as_fatal() {
        let generator = ReportGenerator::new(Arc::new(StalledClient), Duration::from_millis(50));

        let err = generator.cluster_info("docs").await.unwrap_err();

        match err {
            ReportError::ClusterInfo { collection, source } => {
                assert_eq!(collection, "docs");
                assert!(matches!(
                    *source,
                    ReportError::DeadlineExceeded { operation: "collection_cluster_info" }
                ));
            }
            other => panic!("expected cluster info error, got {other:?}"),
        }
    }
}
