use std::io;
use qdrant_client::QdrantError;
use thiserror::Error;

/// Result type for shard report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while building a shard report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create Qdrant client for {url}: {source}")]
    /// The client handle could not be built from the connection settings.
    Connection {
        /// The URL the client was pointed at.
        url: String,
        /// The underlying client error.
        #[source]
        source: QdrantError,
    },

    #[error("Qdrant error: {0}")]
    /// An RPC against the Qdrant service failed.
    Qdrant(#[from] QdrantError),

    #[error("{operation} did not complete before the run deadline")]
    /// The shared run deadline elapsed before the call returned.
    DeadlineExceeded {
        /// Name of the remote operation that timed out.
        operation: &'static str,
    },

    #[error("Could not get health: {0}")]
    /// The health check failed.
    HealthCheck(#[source] Box<ReportError>),

    #[error("Collections could not be retrieved: {0}")]
    /// Listing collections failed. The run continues without collections.
    ListCollections(#[source] Box<ReportError>),

    #[error("Could not get collection cluster info for '{collection}': {source}")]
    /// Fetching cluster info for a collection failed.
    ClusterInfo {
        /// The collection whose cluster info was requested.
        collection: String,
        /// The underlying failure.
        #[source]
        source: Box<ReportError>,
    },

    #[error("Failed to write report: {0}")]
    /// Writing the rendered report failed.
    Output(#[from] io::Error),

    #[error("Failed to serialize report: {0}")]
    /// Encoding the report as JSON failed.
    Serialization(#[from] serde_json::Error),
}

impl ReportError {
    /// Whether this error must abort the run.
    ///
    /// Only a failed collection listing is tolerated; the report then degrades
    /// to an empty collection set.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ReportError::ListCollections(_))
    }
}
