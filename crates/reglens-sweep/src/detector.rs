//! Per-partition relationship detection

use crate::SweepError;
use reglens_analysis::RelationshipClassifier;
use reglens_domain::traits::{DocumentStore, RelationshipStore};
use reglens_domain::{PartitionId, Relationship, RelationshipCandidate, RelationshipId};
use reglens_store::{PersistOutcome, RelationshipWriter};
use std::fmt::{self, Display};

/// Result of processing one partition in a bulk run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionOutcome {
    /// All pairs were classified
    Completed {
        /// Relationships created (in a dry run: that would have been created)
        created: usize,
        /// Candidates dropped because the pair was already linked
        skipped_existing: usize,
        /// Candidates whose existence check or write failed
        persist_errors: usize,
    },

    /// The partition could not be processed at all
    Failed(String),

    /// Never started because the run was cancelled
    Cancelled,
}

impl PartitionOutcome {
    /// Relationships this partition contributed
    pub fn relationships(&self) -> usize {
        match self {
            PartitionOutcome::Completed { created, .. } => *created,
            _ => 0,
        }
    }

    /// Errors this partition contributed to the aggregate
    pub fn errors(&self) -> usize {
        match self {
            PartitionOutcome::Completed { persist_errors, .. } => *persist_errors,
            PartitionOutcome::Failed(_) => 1,
            PartitionOutcome::Cancelled => 0,
        }
    }

    /// Whether the partition finished processing
    pub fn is_completed(&self) -> bool {
        matches!(self, PartitionOutcome::Completed { .. })
    }
}

impl fmt::Display for PartitionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionOutcome::Completed {
                created,
                skipped_existing,
                persist_errors,
            } => write!(
                f,
                "{} created, {} already linked, {} errors",
                created, skipped_existing, persist_errors
            ),
            PartitionOutcome::Failed(reason) => write!(f, "failed: {}", reason),
            PartitionOutcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Classifies every pair within a single partition
///
/// Documents are fetched once per partition; pairs are classified in
/// memory and only surviving candidates reach the relationship store.
pub struct PartitionDetector<'a, S> {
    store: &'a S,
    classifier: &'a RelationshipClassifier,
}

impl<'a, S> PartitionDetector<'a, S>
where
    S: DocumentStore + RelationshipStore,
    <S as DocumentStore>::Error: Display,
    <S as RelationshipStore>::Error: Display,
{
    /// Create a detector over `store`
    pub fn new(store: &'a S, classifier: &'a RelationshipClassifier) -> Self {
        Self { store, classifier }
    }

    fn classify_partition(&self, partition: PartitionId) -> Result<Vec<RelationshipCandidate>, SweepError> {
        let documents = self
            .store
            .documents_in_partition(partition)
            .map_err(|e| SweepError::Store(e.to_string()))?;

        let candidates = self.classifier.classify_all(&documents);
        tracing::debug!(
            "Partition {}: {} documents, {} candidates",
            partition,
            documents.len(),
            candidates.len()
        );
        Ok(candidates)
    }

    /// Candidates for every pair in `partition` that is not linked yet
    ///
    /// Nothing is persisted. Only the partition fetch can fail; a pair whose
    /// existence check fails is logged and left out.
    pub fn detect_relationships_for_partition(
        &self,
        partition: PartitionId,
    ) -> Result<Vec<RelationshipCandidate>, SweepError> {
        let writer = RelationshipWriter::new(self.store);
        let mut fresh = Vec::new();
        for candidate in self.classify_partition(partition)? {
            match writer.existing(&candidate) {
                Ok(None) => fresh.push(candidate),
                Ok(Some(_)) => {}
                Err(e) => tracing::warn!(
                    "Partition {}: skipping pair ({}, {}): {}",
                    partition,
                    candidate.source,
                    candidate.target,
                    e
                ),
            }
        }
        Ok(fresh)
    }

    /// Classify `partition` and persist new relationships
    ///
    /// Never fails: a fetch error becomes [`PartitionOutcome::Failed`] and
    /// per-pair store errors are counted in `persist_errors`.
    pub fn process_partition(
        &self,
        partition: PartitionId,
        detected_at: u64,
        dry_run: bool,
    ) -> PartitionOutcome {
        let candidates = match self.classify_partition(partition) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!("Partition {} failed: {}", partition, e);
                return PartitionOutcome::Failed(e.to_string());
            }
        };

        let writer = RelationshipWriter::new(self.store);
        let mut created = 0;
        let mut skipped_existing = 0;
        let mut persist_errors = 0;

        for candidate in candidates {
            let (source, target) = (candidate.source, candidate.target);
            let result = if dry_run {
                writer.existing(&candidate).map(|found| match found {
                    Some(id) => PersistOutcome::AlreadyLinked(id),
                    None => PersistOutcome::Created(Relationship::from_candidate(
                        RelationshipId::new(),
                        candidate,
                        detected_at,
                    )),
                })
            } else {
                writer.persist(candidate, detected_at)
            };

            match result {
                Ok(PersistOutcome::Created(_)) => created += 1,
                Ok(PersistOutcome::AlreadyLinked(_)) => skipped_existing += 1,
                Err(e) => {
                    persist_errors += 1;
                    tracing::error!(
                        "Partition {}: failed to persist pair ({}, {}): {}",
                        partition,
                        source,
                        target,
                        e
                    );
                }
            }
        }

        tracing::info!(
            "Partition {}: {} new relationships, {} already linked, {} errors{}",
            partition,
            created,
            skipped_existing,
            persist_errors,
            if dry_run { " (dry run)" } else { "" }
        );

        PartitionOutcome::Completed {
            created,
            skipped_existing,
            persist_errors,
        }
    }
}
