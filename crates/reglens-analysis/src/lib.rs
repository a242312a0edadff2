//! Reglens Analysis
//!
//! Pure detection engines over regulatory documents.
//!
//! The crate provides:
//! - Content fingerprints (SHA-256) and word counts
//! - Word-set (Jaccard) similarity
//! - Change detection against the stored version of a document
//! - Relationship classification (redundant / conflicting) for document pairs
//! - All-pairs duplicate discovery
//! - Relationship and conflict summaries
//!
//! Nothing here performs I/O directly; storage is reached through the
//! traits in `reglens_domain::traits`.
//!
//! # Examples
//!
//! ```no_run
//! use reglens_analysis::{DetectionConfig, RelationshipClassifier};
//!
//! let classifier = RelationshipClassifier::new(DetectionConfig::default())?;
//! // let candidate = classifier.classify_pair(&doc_a, &doc_b);
//! # Ok::<(), reglens_analysis::AnalysisError>(())
//! ```

#![warn(missing_docs)]

pub mod change;
pub mod classifier;
mod config;
pub mod duplicates;
mod error;
pub mod fingerprint;
pub mod report;
pub mod similarity;

pub use change::{
    change_history, change_report, classify_change, ChangeDetector, ChangeHistoryEntry, ChangeReport,
    HistoryAction, ProposedDocument,
};
pub use classifier::{RelationshipClassifier, KEYWORD_CONFLICT_SEVERITY};
pub use config::DetectionConfig;
pub use duplicates::{DuplicatePair, DuplicateScanner, SimilarityBand};
pub use error::{AnalysisError, Result};
pub use fingerprint::{fingerprint, word_count};
pub use report::{
    conflict_summary, conflict_warnings, relationship_summary, ConflictSummary, ConflictWarning,
    DocumentRelationshipSummary,
};
pub use similarity::{similarity, PreparedText};
