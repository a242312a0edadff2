//! Reglens Sweep
//!
//! Partition-scoped relationship detection, bulk orchestration across the
//! corpus, and a scheduled background worker.
//!
//! # Overview
//!
//! - **Partition detection**: classify every pair within one partition,
//!   returning candidates or persisting them through the deduplicating writer
//! - **Bulk runs**: process many partitions with bounded concurrency and
//!   per-partition failure isolation
//! - **Cancellation**: stop issuing new partitions while letting running ones finish
//! - **Scheduled sweeps**: repeat bulk runs on an interval, collecting metrics
//!
//! # Usage
//!
//! ## One-off bulk run
//!
//! ```no_run
//! use reglens_analysis::RelationshipClassifier;
//! use reglens_store::SqliteStore;
//! use reglens_sweep::{BulkOrchestrator, SweepConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::new("reglens.db")?);
//!     let orchestrator = BulkOrchestrator::new(
//!         store,
//!         RelationshipClassifier::default_config(),
//!         SweepConfig::default(),
//!     );
//!
//!     let result = orchestrator.run_all().await;
//!     for (partition, reason) in result.failed() {
//!         eprintln!("partition {} failed: {}", partition, reason);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [sweep]
//! max_concurrent_partitions = 4
//! sweep_interval_secs = 3600
//! partitions = []        # empty: all partitions
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod config;
mod detector;
mod error;
mod metrics;
mod orchestrator;
mod worker;

pub use config::SweepConfig;
pub use detector::{PartitionDetector, PartitionOutcome};
pub use error::SweepError;
pub use metrics::SweepMetrics;
pub use orchestrator::{validate_partitions, BulkOrchestrator, BulkResult, CancelHandle};
pub use worker::SweepWorker;
