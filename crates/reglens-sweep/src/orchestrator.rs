//! Bulk relationship detection across partitions

use crate::{PartitionDetector, PartitionOutcome, SweepConfig, SweepError};
use reglens_analysis::RelationshipClassifier;
use reglens_domain::traits::{DocumentStore, RelationshipStore};
use reglens_domain::PartitionId;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Reject partition identifiers outside the fixed range
///
/// All identifiers are checked before any work starts.
pub fn validate_partitions(raw: &[i64]) -> Result<Vec<PartitionId>, SweepError> {
    let mut valid = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();
    for value in raw {
        match PartitionId::new(*value) {
            Ok(p) => valid.push(p),
            Err(_) => invalid.push(value.to_string()),
        }
    }
    if !invalid.is_empty() {
        return Err(SweepError::Input(format!(
            "partition identifiers out of range {}..={}: {}",
            PartitionId::MIN,
            PartitionId::MAX,
            invalid.join(", ")
        )));
    }
    valid.sort();
    valid.dedup();
    Ok(valid)
}

/// Shared cancellation flag for an in-flight bulk run
///
/// Checked before each partition starts; partitions already running finish.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Create an uncancelled handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop issuing new partition work
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so the next run starts normally
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Aggregate result of a bulk run
///
/// Always returned, even when partitions fail: zero relationships with
/// zero errors means nothing was found, not that the run crashed.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResult {
    /// Partitions requested
    pub requested: usize,

    /// Partitions that completed
    pub processed: usize,

    /// Relationships created across completed partitions
    pub total_relationships: usize,

    /// Failed partitions plus per-pair persistence failures
    pub errors: usize,

    /// Outcome of every requested partition
    pub per_partition: BTreeMap<PartitionId, PartitionOutcome>,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Whether the run only classified
    pub dry_run: bool,
}

impl BulkResult {
    fn from_outcomes(
        per_partition: BTreeMap<PartitionId, PartitionOutcome>,
        duration: Duration,
        dry_run: bool,
    ) -> Self {
        Self {
            requested: per_partition.len(),
            processed: per_partition.values().filter(|o| o.is_completed()).count(),
            total_relationships: per_partition.values().map(|o| o.relationships()).sum(),
            errors: per_partition.values().map(|o| o.errors()).sum(),
            per_partition,
            duration,
            dry_run,
        }
    }

    /// Partitions that failed, with their reasons
    pub fn failed(&self) -> impl Iterator<Item = (&PartitionId, &str)> {
        self.per_partition.iter().filter_map(|(p, o)| match o {
            PartitionOutcome::Failed(reason) => Some((p, reason.as_str())),
            _ => None,
        })
    }

    /// Number of partitions skipped by cancellation
    pub fn cancelled(&self) -> usize {
        self.per_partition
            .values()
            .filter(|o| matches!(o, PartitionOutcome::Cancelled))
            .count()
    }
}

/// Drives per-partition detection over many partitions
///
/// Partitions run as blocking tasks on the tokio runtime, at most
/// `max_concurrent_partitions` at a time. Each task returns its own
/// outcome; outcomes are merged only after the tasks complete.
///
/// # Examples
///
/// ```no_run
/// use reglens_analysis::RelationshipClassifier;
/// use reglens_store::SqliteStore;
/// use reglens_sweep::{BulkOrchestrator, SweepConfig};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Arc::new(SqliteStore::new("reglens.db")?);
///     let classifier = RelationshipClassifier::default_config();
///     let orchestrator = BulkOrchestrator::new(store, classifier, SweepConfig::default());
///
///     let result = orchestrator.run(&[7, 12, 40]).await?;
///     println!("{} relationships, {} errors", result.total_relationships, result.errors);
///     Ok(())
/// }
/// ```
pub struct BulkOrchestrator<S> {
    store: Arc<S>,
    classifier: Arc<RelationshipClassifier>,
    config: SweepConfig,
    cancel: CancelHandle,
}

impl<S> BulkOrchestrator<S>
where
    S: DocumentStore + RelationshipStore + Send + Sync + 'static,
    <S as DocumentStore>::Error: Display,
    <S as RelationshipStore>::Error: Display,
{
    /// Create an orchestrator over a shared store
    pub fn new(store: Arc<S>, classifier: RelationshipClassifier, config: SweepConfig) -> Self {
        Self {
            store,
            classifier: Arc::new(classifier),
            config,
            cancel: CancelHandle::new(),
        }
    }

    /// Handle that cancels runs of this orchestrator
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Active configuration
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run detection over raw partition identifiers
    ///
    /// Any identifier outside the fixed range rejects the whole request
    /// before work starts.
    pub async fn run(&self, partitions: &[i64]) -> Result<BulkResult, SweepError> {
        let partitions = validate_partitions(partitions)?;
        Ok(self.run_partitions(partitions).await)
    }

    /// Run detection over the full partition range
    pub async fn run_all(&self) -> BulkResult {
        self.run_partitions(PartitionId::all().collect()).await
    }

    /// Run detection over validated partitions
    pub async fn run_partitions(&self, partitions: Vec<PartitionId>) -> BulkResult {
        let start = Instant::now();
        let detected_at = reglens_store::unix_now();
        let dry_run = self.config.dry_run;
        let limit = self.config.max_concurrent_partitions.max(1);
        let semaphore = Arc::new(Semaphore::new(limit));

        tracing::info!(
            "Starting bulk detection over {} partitions (concurrency {}{})",
            partitions.len(),
            limit,
            if dry_run { ", dry run" } else { "" }
        );

        let mut per_partition = BTreeMap::new();
        let mut handles = Vec::with_capacity(partitions.len());

        for partition in partitions {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    per_partition.insert(partition, PartitionOutcome::Failed(e.to_string()));
                    continue;
                }
            };

            if self.cancel.is_cancelled() {
                tracing::warn!("Bulk run cancelled; skipping partition {}", partition);
                per_partition.insert(partition, PartitionOutcome::Cancelled);
                continue;
            }

            let store = Arc::clone(&self.store);
            let classifier = Arc::clone(&self.classifier);
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                PartitionDetector::new(store.as_ref(), classifier.as_ref())
                    .process_partition(partition, detected_at, dry_run)
            });
            handles.push((partition, handle));
        }

        for (partition, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Partition {} worker aborted: {}", partition, e);
                    PartitionOutcome::Failed(format!("worker aborted: {}", e))
                }
            };
            per_partition.insert(partition, outcome);
        }

        let result = BulkResult::from_outcomes(per_partition, start.elapsed(), dry_run);
        tracing::info!(
            "Bulk detection finished: {}/{} partitions, {} relationships, {} errors in {:?}",
            result.processed,
            result.requested,
            result.total_relationships,
            result.errors,
            result.duration
        );
        result
    }
}
