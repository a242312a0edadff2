//! Configuration for relationship sweeps
//!
//! Defines concurrency, scheduling and which partitions a sweep covers.

use crate::SweepError;
use reglens_domain::PartitionId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for bulk detection and the scheduled worker
///
/// # Examples
///
/// ```
/// use reglens_sweep::SweepConfig;
///
/// let config = SweepConfig::default();
/// assert_eq!(config.max_concurrent_partitions, 4);
///
/// let config = SweepConfig::aggressive();
/// assert_eq!(config.max_concurrent_partitions, 8);
///
/// let config = SweepConfig::conservative();
/// assert_eq!(config.max_concurrent_partitions, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Partitions processed at the same time
    /// Default: 4
    pub max_concurrent_partitions: usize,

    /// Seconds between scheduled sweeps
    /// Default: 3600 (hourly)
    pub sweep_interval_secs: u64,

    /// Partitions covered by a scheduled sweep; empty means all of them
    pub partitions: Vec<u32>,

    /// Classify without persisting anything
    /// Default: false
    pub dry_run: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_concurrent_partitions: 4,
            sweep_interval_secs: 3600,
            partitions: Vec::new(),
            dry_run: false,
        }
    }
}

impl SweepConfig {
    /// More workers, more frequent sweeps
    pub fn aggressive() -> Self {
        Self {
            max_concurrent_partitions: 8,
            sweep_interval_secs: 900,
            ..Self::default()
        }
    }

    /// One partition at a time, sweeping every four hours
    pub fn conservative() -> Self {
        Self {
            max_concurrent_partitions: 1,
            sweep_interval_secs: 4 * 3600,
            ..Self::default()
        }
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Resolve the configured partitions, defaulting to the full range
    pub fn resolved_partitions(&self) -> Result<Vec<PartitionId>, SweepError> {
        if self.partitions.is_empty() {
            return Ok(PartitionId::all().collect());
        }
        let raw: Vec<i64> = self.partitions.iter().map(|p| i64::from(*p)).collect();
        crate::validate_partitions(&raw)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.max_concurrent_partitions == 0 {
            return Err(SweepError::Config(
                "max_concurrent_partitions must be at least 1".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(SweepError::Config(
                "sweep_interval_secs must be at least 1".to_string(),
            ));
        }
        self.resolved_partitions().map(|_| ())
    }
}
