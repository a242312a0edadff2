//! Deduplicating relationship persistence

use reglens_domain::traits::RelationshipStore;
use reglens_domain::{Relationship, RelationshipCandidate, RelationshipId};

/// Result of persisting one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    /// A new relationship was stored
    Created(Relationship),

    /// The pair was already linked; the candidate was discarded
    AlreadyLinked(RelationshipId),
}

impl PersistOutcome {
    /// Whether a new record was written
    pub fn is_created(&self) -> bool {
        matches!(self, PersistOutcome::Created(_))
    }
}

/// Writes candidates only for pairs that are not linked yet
///
/// Both orderings of the pair are checked, and an existing record is never
/// updated or upgraded. Re-running a detection pass is therefore a no-op
/// for pairs it linked before.
pub struct RelationshipWriter<'s, R> {
    store: &'s R,
}

impl<'s, R: RelationshipStore> RelationshipWriter<'s, R> {
    /// Create a writer in front of `store`
    pub fn new(store: &'s R) -> Self {
        Self { store }
    }

    /// Whether the unordered pair of `candidate` is already linked
    pub fn existing(&self, candidate: &RelationshipCandidate) -> Result<Option<RelationshipId>, R::Error> {
        Ok(self
            .store
            .find_relationship(candidate.source, candidate.target)?
            .map(|r| r.id))
    }

    /// Persist `candidate` unless its pair is already linked
    pub fn persist(
        &self,
        candidate: RelationshipCandidate,
        detected_at: u64,
    ) -> Result<PersistOutcome, R::Error> {
        if let Some(id) = self.existing(&candidate)? {
            tracing::debug!(
                "Pair ({}, {}) already linked by {}; skipping",
                candidate.source,
                candidate.target,
                id
            );
            return Ok(PersistOutcome::AlreadyLinked(id));
        }

        let (source, target) = (candidate.source, candidate.target);
        let relationship = match self.store.create_relationship(candidate, detected_at) {
            Ok(relationship) => relationship,
            Err(err) => {
                // Another writer may have linked the pair since the check above
                return match self.store.find_relationship(source, target) {
                    Ok(Some(existing)) => {
                        tracing::debug!(
                            "Pair ({}, {}) linked concurrently by {}; skipping",
                            source,
                            target,
                            existing.id
                        );
                        Ok(PersistOutcome::AlreadyLinked(existing.id))
                    }
                    _ => Err(err),
                };
            }
        };
        tracing::debug!(
            "Created {} relationship {} for ({}, {})",
            relationship.kind.relationship_type(),
            relationship.id,
            relationship.source,
            relationship.target
        );
        Ok(PersistOutcome::Created(relationship))
    }
}
