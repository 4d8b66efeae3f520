#![warn(missing_docs)] // Enforce documentation for all public items

//! `shard_report_lib` powers the `qdrant-shard-report` diagnostic tool.
//!
//! One run connects to a Qdrant cluster and checks its health. It then lists the
//! collections and prints the point count of every local shard of each one.
//!
//! ## Overview
//!
//! - `config`: Connection settings built from the command line.
//! - `qdrant_client_trait`: The remote operations a report needs, mockable in tests.
//! - `report`: Sequential report generation under one shared deadline.
//! - `cli`: Argument parsing and table/JSON rendering.
//! - `error`: The error taxonomy and which errors abort a run.
//!
//! Listing collections is allowed to fail: the report is then empty. A failed health
//! check or cluster info request aborts the run before anything is printed.

/// Command-line interface and output formatting.
pub mod cli;
/// Connection configuration.
pub mod config;
/// Defines the error types and Result alias.
pub mod error;
/// Trait defining the Qdrant operations used by a report, enabling mocking.
pub mod qdrant_client_trait;
pub mod report;

pub use config::ConnectionConfig;
pub use error::{ReportError, Result};
pub use qdrant_client_trait::{connect, QdrantClientTrait};
pub use report::{Report, ReportGenerator, ShardReport, DEFAULT_RUN_TIMEOUT, MAX_RUN_TIMEOUT};
