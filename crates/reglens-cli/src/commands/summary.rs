//! Summary command implementation.

use crate::cli::{ConflictsArgs, SummaryArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use reglens_analysis::{conflict_summary, conflict_warnings, relationship_summary};
use reglens_store::SqliteStore;

/// Execute the summary command.
///
/// With `--document`, summarizes that document's relationships;
/// otherwise prints the corpus-wide conflict summary.
pub fn execute_summary(args: SummaryArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    match args.document {
        Some(key) => {
            let summary = relationship_summary(store, store, &key)?
                .ok_or_else(|| CliError::NotFound(key.to_string()))?;
            let labels = super::labels_for(
                store,
                summary.relationships.iter().flat_map(|r| [r.source, r.target]),
            )?;
            println!("{}", formatter.format_document_summary(&summary, &labels)?);
        }
        None => {
            let summary = conflict_summary(store)?;
            println!("{}", formatter.format_conflict_summary(&summary)?);
        }
    }
    Ok(())
}

/// Execute the conflicts command.
pub fn execute_conflicts(args: ConflictsArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let warnings = conflict_warnings(store, store, &args.document)?
        .ok_or_else(|| CliError::NotFound(args.document.to_string()))?;
    println!("{}", formatter.format_conflict_warnings(&args.document, &warnings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use reglens_domain::traits::RelationshipStore;
    use reglens_domain::{
        ConflictSeverity, DetectionMethod, DocumentKey, PartitionId, RelationshipCandidate,
        RelationshipKind,
    };

    #[test]
    fn test_unknown_document() {
        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let key = DocumentKey::new(PartitionId::new(1).unwrap(), "9");
        let result = execute_summary(SummaryArgs { document: Some(key) }, &store, &formatter);
        assert!(matches!(result, Err(CliError::NotFound(_))));
    }

    #[test]
    fn test_corpus_summary_on_empty_store() {
        let store = SqliteStore::in_memory().unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);
        execute_summary(SummaryArgs { document: None }, &store, &formatter).unwrap();
    }

    #[test]
    fn test_conflicts_for_stored_document() {
        let store = SqliteStore::in_memory().unwrap();
        let p = PartitionId::new(3).unwrap();
        let a = store
            .upsert_document(&DocumentKey::new(p, "1"), "Coastal", "Vessels must carry a permit.", "NOAA")
            .unwrap();
        let b = store
            .upsert_document(&DocumentKey::new(p, "2"), "Inland", "Vessels must not carry a permit.", "NOAA")
            .unwrap();
        store
            .create_relationship(
                RelationshipCandidate::new(
                    a.id,
                    b.id,
                    RelationshipKind::Conflicting(ConflictSeverity::Medium),
                    Some(0.6),
                    "Potential conflict detected based on overlapping scope with conflicting requirements.",
                    DetectionMethod::KeywordConflictAnalysis,
                ),
                1,
            )
            .unwrap();
        let formatter = Formatter::new(OutputFormat::Table, false);

        execute_conflicts(ConflictsArgs { document: a.key.clone() }, &store, &formatter).unwrap();

        let missing = DocumentKey::new(p, "9");
        assert!(matches!(
            execute_conflicts(ConflictsArgs { document: missing }, &store, &formatter),
            Err(CliError::NotFound(_))
        ));
    }
}
