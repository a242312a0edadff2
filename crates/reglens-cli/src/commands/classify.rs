//! Similarity, pair classification and partition detection commands.

use crate::cli::{ClassifyArgs, DetectArgs, SimilarityArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{Formatter, Labels};
use reglens_analysis::{similarity, DuplicateScanner, RelationshipClassifier};
use reglens_domain::traits::DocumentStore;
use reglens_store::SqliteStore;
use reglens_sweep::PartitionDetector;
use std::fs;

/// Execute the similarity command.
pub fn execute_similarity(args: SimilarityArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let a = fs::read_to_string(&args.file_a)?;
    let b = fs::read_to_string(&args.file_b)?;

    let score = similarity(&a, &b);
    let band = DuplicateScanner::from_config(&config.detection).band(score);
    println!("{}", formatter.format_similarity(score, band)?);
    Ok(())
}

/// Execute the classify command.
pub fn execute_classify(
    args: ClassifyArgs,
    store: &SqliteStore,
    classifier: &RelationshipClassifier,
    formatter: &Formatter,
) -> Result<()> {
    let first = store
        .get_document(&args.first)?
        .ok_or_else(|| CliError::NotFound(args.first.to_string()))?;
    let second = store
        .get_document(&args.second)?
        .ok_or_else(|| CliError::NotFound(args.second.to_string()))?;
    if first.id == second.id {
        return Err(CliError::InvalidInput(
            "Cannot classify a document against itself".to_string(),
        ));
    }

    let candidates: Vec<_> = classifier.classify_pair(&first, &second).into_iter().collect();
    let labels: Labels = [(first.id, first.key), (second.id, second.key)].into_iter().collect();
    println!("{}", formatter.format_candidates(&candidates, &labels)?);
    Ok(())
}

/// Execute the detect command.
///
/// Lists candidates for pairs not linked yet; nothing is persisted.
pub fn execute_detect(
    args: DetectArgs,
    store: &SqliteStore,
    classifier: &RelationshipClassifier,
    formatter: &Formatter,
) -> Result<()> {
    let partition = super::partition_arg(args.partition)?;
    let candidates =
        PartitionDetector::new(store, classifier).detect_relationships_for_partition(partition)?;

    let labels = super::labels_for(
        store,
        candidates.iter().flat_map(|c| [c.source, c.target]),
    )?;
    println!("{}", formatter.format_candidates(&candidates, &labels)?);
    Ok(())
}
