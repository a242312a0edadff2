//! Bulk detection command implementation.

use crate::cli::BulkArgs;
use crate::error::Result;
use crate::output::Formatter;
use reglens_analysis::RelationshipClassifier;
use reglens_store::SqliteStore;
use reglens_sweep::{BulkOrchestrator, SweepConfig};
use std::sync::Arc;

/// Execute the bulk command.
///
/// Partitions named on the command line win over the configured list.
/// Ctrl+C stops new partitions from starting; running ones finish.
pub async fn execute_bulk(
    args: BulkArgs,
    store: Arc<SqliteStore>,
    classifier: RelationshipClassifier,
    mut sweep: SweepConfig,
    formatter: &Formatter,
) -> Result<()> {
    if let Some(concurrency) = args.concurrency {
        sweep.max_concurrent_partitions = concurrency;
    }
    sweep.dry_run |= args.dry_run;
    sweep.validate()?;

    let partitions = if args.partitions.is_empty() {
        sweep.resolved_partitions()?
    } else {
        reglens_sweep::validate_partitions(&args.partitions)?
    };

    let orchestrator = BulkOrchestrator::new(store, classifier, sweep);
    let cancel = orchestrator.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; letting running partitions finish");
            cancel.cancel();
        }
    });

    let result = orchestrator.run_partitions(partitions).await;
    interrupt.abort();

    println!("{}", formatter.format_bulk(&result)?);
    for (partition, reason) in result.failed() {
        eprintln!("{}", formatter.error(&format!("Partition {}: {}", partition, reason)));
    }
    Ok(())
}
