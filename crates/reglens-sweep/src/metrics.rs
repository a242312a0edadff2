//! Cumulative metrics across sweep runs

use crate::BulkResult;
use std::time::Duration;

/// Counters accumulated over every bulk run of a worker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepMetrics {
    /// Bulk runs completed
    pub sweep_count: usize,

    /// Partitions that completed across runs
    pub partitions_processed: usize,

    /// Partitions that failed across runs
    pub partitions_failed: usize,

    /// Relationships created across runs
    pub relationships_created: usize,

    /// Errors across runs
    pub errors: usize,

    /// Time spent inside bulk runs
    pub total_runtime: Duration,
}

impl SweepMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one bulk result into the counters
    pub fn record(&mut self, result: &BulkResult) {
        self.sweep_count += 1;
        self.partitions_processed += result.processed;
        self.partitions_failed += result.failed().count();
        self.relationships_created += result.total_relationships;
        self.errors += result.errors;
        self.total_runtime += result.duration;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        [
            "Sweep Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Total runtime: {:.1}s", self.total_runtime.as_secs_f64()),
            format!("Partitions processed: {}", self.partitions_processed),
            format!("Partitions failed: {}", self.partitions_failed),
            format!("Relationships created: {}", self.relationships_created),
            format!("Errors: {}", self.errors),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PartitionOutcome;
    use reglens_domain::PartitionId;
    use std::collections::BTreeMap;

    fn result(created: usize, failed: bool) -> BulkResult {
        let mut per_partition = BTreeMap::new();
        per_partition.insert(
            PartitionId::new(1).unwrap(),
            PartitionOutcome::Completed { created, skipped_existing: 0, persist_errors: 0 },
        );
        if failed {
            per_partition.insert(PartitionId::new(2).unwrap(), PartitionOutcome::Failed("x".into()));
        }
        BulkResult {
            requested: per_partition.len(),
            processed: 1,
            total_relationships: created,
            errors: usize::from(failed),
            per_partition,
            duration: Duration::from_secs(2),
            dry_run: false,
        }
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = SweepMetrics::new();
        assert_eq!(metrics.sweep_count, 0);
        assert_eq!(metrics.relationships_created, 0);
    }

    #[test]
    fn test_record_accumulates() {
        let mut metrics = SweepMetrics::new();
        metrics.record(&result(4, true));
        metrics.record(&result(0, false));

        assert_eq!(metrics.sweep_count, 2);
        assert_eq!(metrics.partitions_processed, 2);
        assert_eq!(metrics.partitions_failed, 1);
        assert_eq!(metrics.relationships_created, 4);
        assert_eq!(metrics.errors, 1);
        assert_eq!(metrics.total_runtime, Duration::from_secs(4));
    }

    #[test]
    fn test_reset() {
        let mut metrics = SweepMetrics::new();
        metrics.record(&result(1, false));
        metrics.reset();
        assert_eq!(metrics, SweepMetrics::default());
    }

    #[test]
    fn test_summary() {
        let mut metrics = SweepMetrics::new();
        metrics.record(&result(3, true));
        let summary = metrics.summary();
        assert!(summary.contains("Sweep cycles: 1"));
        assert!(summary.contains("Relationships created: 3"));
        assert!(summary.contains("Partitions failed: 1"));
        assert!(summary.contains("Total runtime: 2.0s"));
    }
}
