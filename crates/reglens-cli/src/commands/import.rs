//! Import command implementation.

use crate::cli::ImportArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use reglens_analysis::{ChangeDetector, ProposedDocument};
use reglens_domain::DocumentKey;
use reglens_store::SqliteStore;
use serde::Deserialize;
use std::fs;

/// A document as it appears in an import file.
#[derive(Debug, Deserialize)]
struct DocumentRecord {
    partition: i64,
    part_number: String,
    title: String,
    content: String,
    #[serde(default)]
    agency_name: String,
}

/// Execute the import command.
///
/// Every record is classified against the stored version first; only
/// new and changed documents are written.
pub fn execute_import(args: ImportArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let json_data = fs::read_to_string(&args.file)?;
    let records: Vec<DocumentRecord> = serde_json::from_str(&json_data)?;

    let keyed = records
        .into_iter()
        .map(|record| {
            let partition = super::partition_arg(record.partition)?;
            if record.part_number.trim().is_empty() {
                return Err(CliError::InvalidInput(format!(
                    "Empty part number in partition {}",
                    partition
                )));
            }
            Ok((DocumentKey::new(partition, record.part_number.trim()), record))
        })
        .collect::<Result<Vec<_>>>()?;

    let detector = ChangeDetector::new(store);
    let mut rows = Vec::with_capacity(keyed.len());
    let mut stored = 0;

    for (key, record) in keyed {
        let result = detector.detect(
            &key,
            ProposedDocument {
                title: &record.title,
                content: &record.content,
                agency_name: &record.agency_name,
            },
        )?;

        if result.kind.requires_write() && !args.dry_run {
            store.upsert_document(&key, &record.title, &record.content, &record.agency_name)?;
            stored += 1;
        }
        tracing::debug!("{}: {}", key, result.description);
        rows.push((key, result.kind));
    }

    tracing::info!("Imported {} document(s), stored {}", rows.len(), stored);
    println!("{}", formatter.format_import(&rows, stored)?);
    Ok(())
}
