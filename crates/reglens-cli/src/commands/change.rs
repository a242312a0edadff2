//! Change detection and change report commands.

use crate::cli::{DetectChangeArgs, HistoryArgs, ReportArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use reglens_analysis::{change_history, change_report, ChangeDetector, ProposedDocument};
use reglens_domain::traits::DocumentStore;
use reglens_domain::DocumentKey;
use reglens_store::{unix_now, SqliteStore};
use std::fs;

const SECONDS_PER_DAY: u64 = 86_400;

/// Execute the detect-change command.
///
/// Classification only; the stored document is left untouched.
pub fn execute_detect_change(
    args: DetectChangeArgs,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let key = DocumentKey::new(super::partition_arg(args.partition)?, args.part.trim());
    let content = fs::read_to_string(&args.content_file)?;

    let result = ChangeDetector::new(store).detect(
        &key,
        ProposedDocument {
            title: &args.title,
            content: &content,
            agency_name: &args.agency,
        },
    )?;

    println!("{}", formatter.format_change(&key, &result)?);
    Ok(())
}

/// Execute the report command.
pub fn execute_report(args: ReportArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let since = unix_now().saturating_sub(args.since_days.saturating_mul(SECONDS_PER_DAY));
    let report = change_report(store, since)?;
    println!("{}", formatter.format_change_report(&report, args.since_days)?);
    Ok(())
}

/// Execute the history command.
///
/// Fails with `NotFound` when the document was never stored.
pub fn execute_history(args: HistoryArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    if store.get_document(&args.document)?.is_none() {
        return Err(CliError::NotFound(args.document.to_string()));
    }
    let since = unix_now().saturating_sub(args.since_days.saturating_mul(SECONDS_PER_DAY));
    let history = change_history(store, &args.document, since)?;
    println!("{}", formatter.format_history(&args.document, &history, args.since_days)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use reglens_domain::PartitionId;

    #[test]
    fn test_detect_change_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let content_file = dir.path().join("content.txt");
        fs::write(&content_file, "Employers shall provide training.").unwrap();
        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = DetectChangeArgs {
            partition: 29,
            part: "1910".to_string(),
            title: "Safety".to_string(),
            agency: "OSHA".to_string(),
            content_file,
        };
        execute_detect_change(args, &store, &formatter).unwrap();
        assert_eq!(store.document_count().unwrap(), 0);
    }

    #[test]
    fn test_detect_change_rejects_bad_partition() {
        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = DetectChangeArgs {
            partition: 0,
            part: "1".to_string(),
            title: String::new(),
            agency: String::new(),
            content_file: "unused.txt".into(),
        };
        assert!(matches!(
            execute_detect_change(args, &store, &formatter),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_report_over_empty_store() {
        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);
        execute_report(ReportArgs { since_days: 30 }, &store, &formatter).unwrap();
    }

    #[test]
    fn test_history_of_fresh_document() {
        let store = SqliteStore::in_memory().unwrap();
        let key = DocumentKey::new(PartitionId::new(29).unwrap(), "1910");
        store.upsert_document(&key, "Safety", "Employers shall comply.", "OSHA").unwrap();
        let formatter = Formatter::new(OutputFormat::Json, false);

        execute_history(HistoryArgs { document: key, since_days: 1 }, &store, &formatter).unwrap();
    }

    #[test]
    fn test_history_of_unknown_document() {
        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let key = DocumentKey::new(PartitionId::new(29).unwrap(), "1926");
        assert!(matches!(
            execute_history(HistoryArgs { document: key, since_days: 7 }, &store, &formatter),
            Err(CliError::NotFound(_))
        ));
    }
}
