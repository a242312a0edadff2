//! Relationship module - pairwise, logically undirected links between documents

use crate::DocumentId;
use std::fmt;

/// Unique identifier for a persisted relationship, based on UUIDv7
///
/// Assigned by the store at creation time; callers treat it as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationshipId(u128);

impl RelationshipId {
    /// Generate a new UUIDv7-based RelationshipId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RelationshipId from a raw u128 value (storage deserialization)
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RelationshipId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid relationship id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RelationshipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Type of relationship between documents
///
/// Only `Redundant` and `Conflicting` are ever produced by content
/// heuristics; the rest exist for externally asserted relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationshipType {
    /// Documents that duplicate each other
    Redundant,

    /// Documents that contradict each other
    Conflicting,

    /// Documents that work together
    Complementary,

    /// One document replaces another
    Superseding,

    /// One document references another
    Referenced,

    /// Documents with overlapping scope
    Overlapping,

    /// One document depends on another
    Dependent,
}

impl RelationshipType {
    /// Every relationship type, in declaration order
    pub const ALL: [RelationshipType; 7] = [
        RelationshipType::Redundant,
        RelationshipType::Conflicting,
        RelationshipType::Complementary,
        RelationshipType::Superseding,
        RelationshipType::Referenced,
        RelationshipType::Overlapping,
        RelationshipType::Dependent,
    ];

    /// Storage code for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Redundant => "REDUNDANT",
            RelationshipType::Conflicting => "CONFLICTING",
            RelationshipType::Complementary => "COMPLEMENTARY",
            RelationshipType::Superseding => "SUPERSEDING",
            RelationshipType::Referenced => "REFERENCED",
            RelationshipType::Overlapping => "OVERLAPPING",
            RelationshipType::Dependent => "DEPENDENT",
        }
    }

    /// Parse a storage code (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid relationship type: {}", s))
    }
}

/// Severity of a conflict between two documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictSeverity {
    /// Minor inconsistencies
    Low,

    /// Moderate conflicts requiring attention
    Medium,

    /// Significant conflicts needing resolution
    High,

    /// Severe conflicts requiring immediate action
    Critical,
}

impl ConflictSeverity {
    /// Every severity, lowest first
    pub const ALL: [ConflictSeverity; 4] = [
        ConflictSeverity::Low,
        ConflictSeverity::Medium,
        ConflictSeverity::High,
        ConflictSeverity::Critical,
    ];

    /// Storage code for this severity
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictSeverity::Low => "LOW",
            ConflictSeverity::Medium => "MEDIUM",
            ConflictSeverity::High => "HIGH",
            ConflictSeverity::Critical => "CRITICAL",
        }
    }

    /// Parse a storage code (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Whether this severity needs escalation (High or Critical)
    pub fn is_high(&self) -> bool {
        matches!(self, ConflictSeverity::High | ConflictSeverity::Critical)
    }
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship type together with the data only some types carry
///
/// A severity exists only for conflicts, so it lives inside the
/// `Conflicting` variant rather than next to the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// See [`RelationshipType::Redundant`]
    Redundant,
    /// See [`RelationshipType::Conflicting`]
    Conflicting(ConflictSeverity),
    /// See [`RelationshipType::Complementary`]
    Complementary,
    /// See [`RelationshipType::Superseding`]
    Superseding,
    /// See [`RelationshipType::Referenced`]
    Referenced,
    /// See [`RelationshipType::Overlapping`]
    Overlapping,
    /// See [`RelationshipType::Dependent`]
    Dependent,
}

impl RelationshipKind {
    /// The plain relationship type
    pub fn relationship_type(&self) -> RelationshipType {
        match self {
            RelationshipKind::Redundant => RelationshipType::Redundant,
            RelationshipKind::Conflicting(_) => RelationshipType::Conflicting,
            RelationshipKind::Complementary => RelationshipType::Complementary,
            RelationshipKind::Superseding => RelationshipType::Superseding,
            RelationshipKind::Referenced => RelationshipType::Referenced,
            RelationshipKind::Overlapping => RelationshipType::Overlapping,
            RelationshipKind::Dependent => RelationshipType::Dependent,
        }
    }

    /// Conflict severity, present only for conflicts
    pub fn conflict_severity(&self) -> Option<ConflictSeverity> {
        match self {
            RelationshipKind::Conflicting(severity) => Some(*severity),
            _ => None,
        }
    }

    /// Rebuild a kind from its stored columns
    ///
    /// Fails when a conflict has no severity or a non-conflict carries one.
    pub fn from_parts(
        relationship_type: RelationshipType,
        severity: Option<ConflictSeverity>,
    ) -> Result<Self, String> {
        match (relationship_type, severity) {
            (RelationshipType::Conflicting, Some(s)) => Ok(RelationshipKind::Conflicting(s)),
            (RelationshipType::Conflicting, None) => {
                Err("Conflicting relationship without severity".to_string())
            }
            (other, Some(_)) => Err(format!("Severity set on non-conflict relationship {}", other)),
            (RelationshipType::Redundant, None) => Ok(RelationshipKind::Redundant),
            (RelationshipType::Complementary, None) => Ok(RelationshipKind::Complementary),
            (RelationshipType::Superseding, None) => Ok(RelationshipKind::Superseding),
            (RelationshipType::Referenced, None) => Ok(RelationshipKind::Referenced),
            (RelationshipType::Overlapping, None) => Ok(RelationshipKind::Overlapping),
            (RelationshipType::Dependent, None) => Ok(RelationshipKind::Dependent),
        }
    }
}

/// Tag identifying how a relationship was detected
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DetectionMethod {
    /// Word-set similarity above the redundancy threshold
    SimilarityAnalysis,

    /// Mid-range similarity plus opposing obligation terms
    KeywordConflictAnalysis,

    /// Any other tag (manual review, imports, external tools)
    Other(String),
}

impl DetectionMethod {
    /// Tag as stored in `detected_by`
    pub fn as_str(&self) -> &str {
        match self {
            DetectionMethod::SimilarityAnalysis => "SIMILARITY_ANALYSIS",
            DetectionMethod::KeywordConflictAnalysis => "KEYWORD_CONFLICT_ANALYSIS",
            DetectionMethod::Other(tag) => tag,
        }
    }

    /// Parse a stored tag
    pub fn parse(s: &str) -> Self {
        match s {
            "SIMILARITY_ANALYSIS" => DetectionMethod::SimilarityAnalysis,
            "KEYWORD_CONFLICT_ANALYSIS" => DetectionMethod::KeywordConflictAnalysis,
            other => DetectionMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unordered pair key: `(a, b)` and `(b, a)` map to the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: DocumentId,
    high: DocumentId,
}

impl PairKey {
    /// Build the key for a pair in either order
    pub fn new(a: DocumentId, b: DocumentId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Smaller document id
    pub fn low(&self) -> DocumentId {
        self.low
    }

    /// Larger document id
    pub fn high(&self) -> DocumentId {
        self.high
    }
}

/// A relationship proposed by a detector, not yet checked against the store
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipCandidate {
    /// Source document (as ordered by the detector)
    pub source: DocumentId,

    /// Target document
    pub target: DocumentId,

    /// Relationship type and conflict severity
    pub kind: RelationshipKind,

    /// Similarity score in [0.0, 1.0], if one was computed
    pub similarity_score: Option<f64>,

    /// Free-text rationale
    pub overlap_details: String,

    /// How the candidate was detected
    pub detected_by: DetectionMethod,
}

impl RelationshipCandidate {
    /// Create a new candidate
    ///
    /// # Panics
    ///
    /// Panics if `similarity_score` is outside [0, 1].
    pub fn new(
        source: DocumentId,
        target: DocumentId,
        kind: RelationshipKind,
        similarity_score: Option<f64>,
        overlap_details: impl Into<String>,
        detected_by: DetectionMethod,
    ) -> Self {
        if let Some(score) = similarity_score {
            assert!((0.0..=1.0).contains(&score), "Similarity must be in [0, 1]");
        }

        Self {
            source,
            target,
            kind,
            similarity_score,
            overlap_details: overlap_details.into(),
            detected_by,
        }
    }

    /// Unordered key of the pair this candidate links
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.source, self.target)
    }
}

/// A persisted relationship between two documents
///
/// Logically undirected: at most one record exists per unordered pair.
/// Only external review workflows mutate `is_confirmed`, `review_notes`
/// and `version`.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Store-assigned identifier
    pub id: RelationshipId,

    /// Source document as stored
    pub source: DocumentId,

    /// Target document as stored
    pub target: DocumentId,

    /// Relationship type and conflict severity
    pub kind: RelationshipKind,

    /// Similarity score in [0.0, 1.0]
    pub similarity_score: Option<f64>,

    /// Free-text rationale
    pub overlap_details: String,

    /// Detection method tag
    pub detected_by: DetectionMethod,

    /// Human review flag, never set by detectors
    pub is_confirmed: bool,

    /// Reviewer notes
    pub review_notes: Option<String>,

    /// When the relationship was detected (Unix seconds)
    pub detected_at: u64,

    /// Last modification (Unix seconds)
    pub updated_at: u64,

    /// Optimistic concurrency counter for review edits
    pub version: u64,
}

impl Relationship {
    /// Materialize a candidate as a fresh, unconfirmed record
    pub fn from_candidate(id: RelationshipId, candidate: RelationshipCandidate, detected_at: u64) -> Self {
        Self {
            id,
            source: candidate.source,
            target: candidate.target,
            kind: candidate.kind,
            similarity_score: candidate.similarity_score,
            overlap_details: candidate.overlap_details,
            detected_by: candidate.detected_by,
            is_confirmed: false,
            review_notes: None,
            detected_at,
            updated_at: detected_at,
            version: 0,
        }
    }

    /// Unordered key of the linked pair
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.source, self.target)
    }

    /// Whether this relationship touches the given document
    pub fn involves(&self, id: DocumentId) -> bool {
        self.source == id || self.target == id
    }

    /// The document on the other end, if `id` is one of the two ends
    pub fn other_end(&self, id: DocumentId) -> Option<DocumentId> {
        if self.source == id {
            Some(self.target)
        } else if self.target == id {
            Some(self.source)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(n: u64) -> DocumentId {
        DocumentId::from_value(n)
    }

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new(doc(3), doc(9)), PairKey::new(doc(9), doc(3)));
        let key = PairKey::new(doc(9), doc(3));
        assert_eq!(key.low(), doc(3));
        assert_eq!(key.high(), doc(9));
    }

    #[test]
    fn test_relationship_type_codes() {
        for t in RelationshipType::ALL {
            assert_eq!(RelationshipType::parse(t.as_str()), Some(t));
        }
        assert_eq!(RelationshipType::parse("redundant"), Some(RelationshipType::Redundant));
        assert!("UNKNOWN".parse::<RelationshipType>().is_err());
    }

    #[test]
    fn test_severity_codes() {
        for s in ConflictSeverity::ALL {
            assert_eq!(ConflictSeverity::parse(s.as_str()), Some(s));
        }
        assert!(ConflictSeverity::High.is_high());
        assert!(ConflictSeverity::Critical.is_high());
        assert!(!ConflictSeverity::Medium.is_high());
    }

    #[test]
    fn test_kind_severity_only_for_conflicts() {
        let kind = RelationshipKind::Conflicting(ConflictSeverity::Medium);
        assert_eq!(kind.relationship_type(), RelationshipType::Conflicting);
        assert_eq!(kind.conflict_severity(), Some(ConflictSeverity::Medium));
        assert_eq!(RelationshipKind::Redundant.conflict_severity(), None);

        assert!(RelationshipKind::from_parts(RelationshipType::Conflicting, None).is_err());
        assert!(RelationshipKind::from_parts(
            RelationshipType::Redundant,
            Some(ConflictSeverity::Low)
        )
        .is_err());
        assert_eq!(
            RelationshipKind::from_parts(RelationshipType::Dependent, None),
            Ok(RelationshipKind::Dependent)
        );
    }

    #[test]
    fn test_detection_method_tags() {
        assert_eq!(DetectionMethod::SimilarityAnalysis.as_str(), "SIMILARITY_ANALYSIS");
        assert_eq!(
            DetectionMethod::parse("KEYWORD_CONFLICT_ANALYSIS"),
            DetectionMethod::KeywordConflictAnalysis
        );
        assert_eq!(
            DetectionMethod::parse("MANUAL_REVIEW"),
            DetectionMethod::Other("MANUAL_REVIEW".to_string())
        );
    }

    #[test]
    fn test_from_candidate_is_unconfirmed() {
        let candidate = RelationshipCandidate::new(
            doc(1),
            doc(2),
            RelationshipKind::Redundant,
            Some(0.9),
            "overlap",
            DetectionMethod::SimilarityAnalysis,
        );
        let rel = Relationship::from_candidate(RelationshipId::new(), candidate, 1000);
        assert!(!rel.is_confirmed);
        assert_eq!(rel.version, 0);
        assert_eq!(rel.detected_at, rel.updated_at);
        assert_eq!(rel.other_end(doc(1)), Some(doc(2)));
        assert_eq!(rel.other_end(doc(7)), None);
    }

    #[test]
    #[should_panic(expected = "Similarity must be in [0, 1]")]
    fn test_candidate_rejects_out_of_range_score() {
        RelationshipCandidate::new(
            doc(1),
            doc(2),
            RelationshipKind::Redundant,
            Some(1.5),
            "",
            DetectionMethod::SimilarityAnalysis,
        );
    }
}
