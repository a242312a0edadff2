//! Duplicates command implementation.

use crate::cli::DuplicatesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use reglens_analysis::DuplicateScanner;
use reglens_store::SqliteStore;

/// Execute the duplicates command.
pub fn execute_duplicates(
    args: DuplicatesArgs,
    store: &SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let partition = args.partition.map(super::partition_arg).transpose()?;
    let pairs = DuplicateScanner::from_config(&config.detection).scan_store(store, partition, args.threshold)?;

    println!("{}", formatter.format_duplicates(&pairs)?);
    Ok(())
}
