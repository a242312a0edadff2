//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::error::Result;
use crate::output::Formatter;
use reglens_analysis::RelationshipClassifier;
use reglens_store::SqliteStore;
use reglens_sweep::{SweepConfig, SweepWorker};
use std::sync::Arc;

/// Execute the watch command.
///
/// Sweeps the configured partitions every `sweep_interval_secs`, starting
/// immediately, until Ctrl+C or until `--cycles` sweeps have run.
pub async fn execute_watch(
    args: WatchArgs,
    store: Arc<SqliteStore>,
    classifier: RelationshipClassifier,
    sweep: SweepConfig,
    formatter: &Formatter,
) -> Result<()> {
    let mut worker = SweepWorker::new(store, classifier, sweep)?;

    match args.cycles {
        Some(cycles) => {
            let cancel = worker.cancel_handle();
            let interrupt = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received; finishing the current sweep");
                    cancel.cancel();
                }
            });
            let outcome = worker.run_cycles(cycles).await;
            interrupt.abort();
            outcome?
        }
        None => worker.run().await?,
    }

    let metrics = worker.metrics();
    let message = format!(
        "{} sweep(s): {} relationship(s) created, {} error(s)",
        metrics.sweep_count, metrics.relationships_created, metrics.errors
    );
    if metrics.errors > 0 {
        println!("{}", formatter.warning(&message));
    } else {
        println!("{}", formatter.success(&message));
    }
    Ok(())
}
