//! Command implementations.

pub mod bulk;
pub mod change;
pub mod classify;
pub mod duplicates;
pub mod import;
pub mod summary;
pub mod watch;

pub use self::bulk::execute_bulk;
pub use self::change::{execute_detect_change, execute_history, execute_report};
pub use self::classify::{execute_classify, execute_detect, execute_similarity};
pub use self::duplicates::execute_duplicates;
pub use self::import::execute_import;
pub use self::summary::{execute_conflicts, execute_summary};
pub use self::watch::execute_watch;

use crate::error::{CliError, Result};
use crate::output::Labels;
use reglens_domain::{DocumentId, PartitionId};
use reglens_store::SqliteStore;

/// Validate a partition argument.
pub(crate) fn partition_arg(value: i64) -> Result<PartitionId> {
    PartitionId::new(value).map_err(|e| CliError::InvalidInput(e.to_string()))
}

/// Look up the keys of `ids` for display.
pub(crate) fn labels_for(
    store: &SqliteStore,
    ids: impl IntoIterator<Item = DocumentId>,
) -> Result<Labels> {
    let mut labels = Labels::new();
    for id in ids {
        if labels.contains_key(&id) {
            continue;
        }
        if let Some(key) = store.document_key(id)? {
            labels.insert(id, key);
        }
    }
    Ok(labels)
}
