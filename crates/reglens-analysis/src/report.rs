//! Relationship summaries for review workflows

use crate::AnalysisError;
use reglens_domain::traits::{DocumentStore, RelationshipStore};
use reglens_domain::{
    ConflictSeverity, DocumentId, DocumentKey, Relationship, RelationshipId, RelationshipType,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Relationships touching a single document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRelationshipSummary {
    /// Document the summary is about
    pub key: DocumentKey,

    /// Document title
    pub title: String,

    /// Relationships of any type touching the document
    pub total_relationships: usize,

    /// Conflicts touching the document
    pub total_conflicts: usize,

    /// Relationship counts per type
    pub by_type: BTreeMap<RelationshipType, usize>,

    /// Conflict counts per severity
    pub conflicts_by_severity: BTreeMap<ConflictSeverity, usize>,

    /// Whether any conflict is HIGH or CRITICAL
    pub has_high_severity_conflicts: bool,

    /// The relationships themselves
    pub relationships: Vec<Relationship>,
}

/// Corpus-wide conflict counts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictSummary {
    /// Conflict counts per severity, zero-filled for every severity
    pub by_severity: BTreeMap<ConflictSeverity, usize>,

    /// Relationships of any type not yet confirmed by a reviewer
    pub unconfirmed: usize,

    /// Every persisted relationship
    pub total_relationships: usize,
}

impl ConflictSummary {
    /// Total conflicts across severities
    pub fn total_conflicts(&self) -> usize {
        self.by_severity.values().sum()
    }
}

/// Summarize the relationships of the document at `key`
///
/// Returns `Ok(None)` when no such document is stored.
pub fn relationship_summary<D, R>(
    documents: &D,
    relationships: &R,
    key: &DocumentKey,
) -> Result<Option<DocumentRelationshipSummary>, AnalysisError>
where
    D: DocumentStore,
    D::Error: Display,
    R: RelationshipStore,
    R::Error: Display,
{
    let Some(document) = documents
        .get_document(key)
        .map_err(|e| AnalysisError::Store(e.to_string()))?
    else {
        tracing::warn!("No stored document at {}", key);
        return Ok(None);
    };

    let linked = relationships
        .relationships_for_document(document.id)
        .map_err(|e| AnalysisError::Store(e.to_string()))?;

    let mut by_type = BTreeMap::new();
    let mut conflicts_by_severity = BTreeMap::new();
    for rel in &linked {
        *by_type.entry(rel.kind.relationship_type()).or_insert(0) += 1;
        if let Some(severity) = rel.kind.conflict_severity() {
            *conflicts_by_severity.entry(severity).or_insert(0) += 1;
        }
    }

    Ok(Some(DocumentRelationshipSummary {
        key: document.key,
        title: document.title,
        total_relationships: linked.len(),
        total_conflicts: conflicts_by_severity.values().sum(),
        has_high_severity_conflicts: conflicts_by_severity.keys().any(|s| s.is_high()),
        by_type,
        conflicts_by_severity,
        relationships: linked,
    }))
}

/// Count conflicts by severity and unconfirmed relationships across the corpus
pub fn conflict_summary<R>(relationships: &R) -> Result<ConflictSummary, AnalysisError>
where
    R: RelationshipStore,
    R::Error: Display,
{
    let all = relationships
        .all_relationships()
        .map_err(|e| AnalysisError::Store(e.to_string()))?;

    let mut summary = ConflictSummary {
        by_severity: ConflictSeverity::ALL.iter().map(|s| (*s, 0)).collect(),
        unconfirmed: 0,
        total_relationships: all.len(),
    };
    for rel in &all {
        if let Some(severity) = rel.kind.conflict_severity() {
            *summary.by_severity.entry(severity).or_insert(0) += 1;
        }
        if !rel.is_confirmed {
            summary.unconfirmed += 1;
        }
    }
    Ok(summary)
}

/// A conflict seen from one of its two documents
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictWarning {
    /// The conflicting relationship
    pub relationship: RelationshipId,

    /// Document on the other end
    pub other: DocumentId,

    /// Key of the other document, if it is still stored
    pub other_key: Option<DocumentKey>,

    /// Title of the other document, if it is still stored
    pub other_title: Option<String>,

    /// Conflict severity
    pub severity: ConflictSeverity,

    /// Similarity score recorded at detection
    pub similarity_score: Option<f64>,

    /// Rationale recorded at detection
    pub details: String,

    /// Whether a reviewer confirmed the conflict
    pub is_confirmed: bool,

    /// When the conflict was detected (Unix seconds)
    pub detected_at: u64,
}

/// Conflicts touching the document at `key`, most severe first
///
/// Returns `Ok(None)` when no such document is stored. A conflict whose
/// other document has since disappeared is still listed, without a key
/// or title.
pub fn conflict_warnings<D, R>(
    documents: &D,
    relationships: &R,
    key: &DocumentKey,
) -> Result<Option<Vec<ConflictWarning>>, AnalysisError>
where
    D: DocumentStore,
    D::Error: Display,
    R: RelationshipStore,
    R::Error: Display,
{
    let Some(document) = documents
        .get_document(key)
        .map_err(|e| AnalysisError::Store(e.to_string()))?
    else {
        tracing::warn!("No stored document at {}", key);
        return Ok(None);
    };

    let conflicts: Vec<Relationship> = relationships
        .relationships_for_document(document.id)
        .map_err(|e| AnalysisError::Store(e.to_string()))?
        .into_iter()
        .filter(|r| r.kind.relationship_type() == RelationshipType::Conflicting)
        .collect();
    if conflicts.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let known: HashMap<DocumentId, (DocumentKey, String)> = documents
        .all_documents()
        .map_err(|e| AnalysisError::Store(e.to_string()))?
        .into_iter()
        .map(|d| (d.id, (d.key, d.title)))
        .collect();

    let mut warnings: Vec<ConflictWarning> = conflicts
        .into_iter()
        .filter_map(|rel| {
            let severity = rel.kind.conflict_severity()?;
            let other = rel.other_end(document.id)?;
            let (other_key, other_title) = match known.get(&other) {
                Some((k, t)) => (Some(k.clone()), Some(t.clone())),
                None => (None, None),
            };
            Some(ConflictWarning {
                relationship: rel.id,
                other,
                other_key,
                other_title,
                severity,
                similarity_score: rel.similarity_score,
                details: rel.overlap_details,
                is_confirmed: rel.is_confirmed,
                detected_at: rel.detected_at,
            })
        })
        .collect();
    warnings.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.detected_at.cmp(&b.detected_at)));

    tracing::debug!("{} conflict warnings for {}", warnings.len(), key);
    Ok(Some(warnings))
}
