//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the detection engines and
//! whatever storage holds documents and relationships. Implementations
//! live in other crates (reglens-store) or in tests.

use crate::{Document, DocumentId, DocumentKey, PartitionId, Relationship, RelationshipCandidate};

/// Read-only access to stored documents
///
/// Implemented by the infrastructure layer (reglens-store)
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Get the current version of a document by key
    fn get_document(&self, key: &DocumentKey) -> Result<Option<Document>, Self::Error>;

    /// Get every document in a partition, in a stable order
    fn documents_in_partition(&self, partition: PartitionId) -> Result<Vec<Document>, Self::Error>;

    /// Get every document in the corpus, in a stable order
    fn all_documents(&self) -> Result<Vec<Document>, Self::Error>;

    /// Get documents updated at or after `since` (Unix seconds)
    fn documents_updated_since(&self, since: u64) -> Result<Vec<Document>, Self::Error>;
}

/// Access to persisted relationships
///
/// Writes are append-only creates. Implementations must treat `(a, b)`
/// and `(b, a)` as the same pair.
pub trait RelationshipStore {
    /// Error type for store operations
    type Error;

    /// Find the relationship linking `a` and `b`, in either order
    fn find_relationship(
        &self,
        a: DocumentId,
        b: DocumentId,
    ) -> Result<Option<Relationship>, Self::Error>;

    /// Persist a candidate as a new relationship
    fn create_relationship(
        &self,
        candidate: RelationshipCandidate,
        detected_at: u64,
    ) -> Result<Relationship, Self::Error>;

    /// All relationships touching a document
    fn relationships_for_document(&self, id: DocumentId) -> Result<Vec<Relationship>, Self::Error>;

    /// Every persisted relationship
    fn all_relationships(&self) -> Result<Vec<Relationship>, Self::Error>;
}
