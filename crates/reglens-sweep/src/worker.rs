//! Background worker for scheduled relationship detection

use crate::{BulkOrchestrator, BulkResult, CancelHandle, SweepConfig, SweepError, SweepMetrics};
use reglens_analysis::RelationshipClassifier;
use reglens_domain::traits::{DocumentStore, RelationshipStore};
use reglens_domain::PartitionId;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{interval, Duration};

/// Background worker that runs bulk detection on a schedule
///
/// # Examples
///
/// ```no_run
/// use reglens_analysis::RelationshipClassifier;
/// use reglens_store::SqliteStore;
/// use reglens_sweep::{SweepConfig, SweepWorker};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = Arc::new(SqliteStore::new("reglens.db")?);
///     let classifier = RelationshipClassifier::default_config();
///     let mut worker = SweepWorker::new(store, classifier, SweepConfig::default())?;
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run().await?;
///     Ok(())
/// }
/// ```
pub struct SweepWorker<S> {
    orchestrator: BulkOrchestrator<S>,
    partitions: Vec<PartitionId>,
    interval: Duration,
    metrics: SweepMetrics,
}

impl<S> SweepWorker<S>
where
    S: DocumentStore + RelationshipStore + Send + Sync + 'static,
    <S as DocumentStore>::Error: Display,
    <S as RelationshipStore>::Error: Display,
{
    /// Create a worker, validating the configuration
    pub fn new(
        store: Arc<S>,
        classifier: RelationshipClassifier,
        config: SweepConfig,
    ) -> Result<Self, SweepError> {
        config.validate()?;
        let partitions = config.resolved_partitions()?;
        let interval = config.sweep_interval();
        Ok(Self {
            orchestrator: BulkOrchestrator::new(store, classifier, config),
            partitions,
            interval,
            metrics: SweepMetrics::new(),
        })
    }

    /// Handle that cancels the bulk run in progress
    pub fn cancel_handle(&self) -> CancelHandle {
        self.orchestrator.cancel_handle()
    }

    async fn sweep_once(&mut self) -> BulkResult {
        let result = self.orchestrator.run_partitions(self.partitions.clone()).await;
        self.metrics.record(&result);
        result
    }

    /// Run the worker until Ctrl+C or until the cancel handle fires
    ///
    /// The first sweep starts immediately. A signal that arrives mid-sweep
    /// cancels the partitions not yet started; the worker stops once the
    /// running ones finish.
    pub async fn run(&mut self) -> Result<(), SweepError> {
        let cancel = self.cancel_handle();
        cancel.reset();

        let shutdown = Arc::new(Notify::new());
        let listener = {
            let cancel = cancel.clone();
            let shutdown = Arc::clone(&shutdown);
            tokio::spawn(async move {
                let signal = tokio::signal::ctrl_c().await;
                if signal.is_ok() {
                    tracing::info!("Shutdown signal received, cancelling sweep");
                }
                cancel.cancel();
                shutdown.notify_one();
                signal
            })
        };

        let mut ticker = interval(self.interval);
        tracing::info!(
            "Sweep worker started (interval: {:?}, {} partitions)",
            self.interval,
            self.partitions.len()
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.notified() => break,
                _ = ticker.tick() => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    tracing::debug!("Starting sweep cycle");
                    let result = self.sweep_once().await;
                    if result.cancelled() > 0 {
                        tracing::warn!(
                            "Sweep cancelled: {} partitions skipped, {} relationships",
                            result.cancelled(),
                            result.total_relationships
                        );
                    } else if result.errors > 0 {
                        tracing::warn!(
                            "Sweep completed with {} errors: {} relationships",
                            result.errors,
                            result.total_relationships
                        );
                    } else {
                        tracing::info!("Sweep completed: {} relationships", result.total_relationships);
                    }
                }
            }
        }

        tracing::info!("Sweep worker stopped. Final metrics:\n{}", self.metrics.summary());

        if listener.is_finished() {
            listener
                .await
                .map_err(|e| SweepError::Worker(e.to_string()))?
                .map_err(|e| SweepError::Worker(e.to_string()))?;
        } else {
            listener.abort();
        }
        Ok(())
    }

    /// Run for a specific number of cycles
    ///
    /// Stops early if the cancel handle fires.
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<(), SweepError> {
        let cancel = self.cancel_handle();
        cancel.reset();
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Sweep worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            if cancel.is_cancelled() {
                tracing::info!("Sweep worker cancelled after {} cycles", cycle);
                break;
            }
            tracing::debug!("Starting sweep cycle {}/{}", cycle + 1, cycles);

            let result = self.sweep_once().await;
            tracing::info!(
                "Sweep {}/{} completed: {} relationships, {} errors",
                cycle + 1,
                cycles,
                result.total_relationships,
                result.errors
            );
        }

        tracing::info!(
            "Sweep worker finished. Final metrics:\n{}",
            self.metrics.summary()
        );
        Ok(())
    }

    /// Cumulative metrics
    pub fn metrics(&self) -> &SweepMetrics {
        &self.metrics
    }

    /// Reset the metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}
