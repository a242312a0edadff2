//! Reglens Domain Layer
//!
//! Core domain model for regulatory change and relationship detection.
//! It depends only on `uuid` and defines the value types and trait
//! interfaces that every other layer builds on.
//!
//! ## Key Concepts
//!
//! - **Document**: regulatory text keyed by (partition, part number)
//! - **Partition**: a disjoint slice of the corpus (a CFR title) bounding pairwise work
//! - **Relationship**: an undirected link between two documents
//! - **Candidate**: a detector output not yet checked against the store
//! - **Change**: classification of a proposed update against the stored version
//!
//! ## Architecture
//!
//! - No I/O, no storage, no logging
//! - Closed enums for every category so new variants are compile-visible
//! - Trait definitions for the document and relationship stores

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod change;
pub mod document;
pub mod relationship;
pub mod traits;

// Re-exports for convenience
pub use change::{ChangeDetails, ChangeKind, ChangeResult, ContentChange, FieldChange};
pub use document::{Document, DocumentId, DocumentKey, InvalidPartition, PartitionId};
pub use relationship::{
    ConflictSeverity, DetectionMethod, PairKey, Relationship, RelationshipCandidate,
    RelationshipId, RelationshipKind, RelationshipType,
};
