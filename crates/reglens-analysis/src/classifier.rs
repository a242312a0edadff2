//! Relationship classification for a pair of documents

use crate::similarity::PreparedText;
use crate::{AnalysisError, DetectionConfig};
use rayon::prelude::*;
use reglens_domain::{
    ConflictSeverity, DetectionMethod, Document, DocumentId, RelationshipCandidate,
    RelationshipKind,
};

/// Severity assigned to every keyword-detected conflict
///
/// The keyword heuristic carries no evidence strength, so it does not
/// grade severity.
pub const KEYWORD_CONFLICT_SEVERITY: ConflictSeverity = ConflictSeverity::Medium;

/// Decides whether two documents are redundant, conflicting, or unrelated
///
/// Emits at most one candidate per pair:
/// - similarity above `redundancy_threshold` → `Redundant`
/// - else similarity above `conflict_threshold` with a conflict signature →
///   `Conflicting` at [`KEYWORD_CONFLICT_SEVERITY`]
/// - else nothing
///
/// # Examples
///
/// ```
/// use reglens_analysis::{DetectionConfig, RelationshipClassifier};
/// use reglens_domain::{DocumentId, RelationshipType};
///
/// let classifier = RelationshipClassifier::new(DetectionConfig::default()).unwrap();
/// let text = "Permits are required for all activities.";
/// let candidate = classifier
///     .classify_texts(DocumentId::from_value(1), text, DocumentId::from_value(2), text)
///     .unwrap();
/// assert_eq!(candidate.kind.relationship_type(), RelationshipType::Redundant);
/// assert_eq!(candidate.similarity_score, Some(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct RelationshipClassifier {
    config: DetectionConfig,
    negative_terms: Vec<String>,
    positive_terms: Vec<String>,
}

fn normalize_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl RelationshipClassifier {
    /// Create a classifier, validating the configuration
    pub fn new(config: DetectionConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let negative_terms = normalize_terms(&config.negative_terms);
        let positive_terms = normalize_terms(&config.positive_terms);
        Ok(Self {
            config,
            negative_terms,
            positive_terms,
        })
    }

    /// Create a classifier with default configuration
    pub fn default_config() -> Self {
        let config = DetectionConfig::default();
        Self {
            negative_terms: normalize_terms(&config.negative_terms),
            positive_terms: normalize_terms(&config.positive_terms),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Classify two stored documents
    pub fn classify_pair(&self, a: &Document, b: &Document) -> Option<RelationshipCandidate> {
        self.classify_texts(a.id, &a.content, b.id, &b.content)
    }

    /// Classify every unordered pair of `documents`
    ///
    /// Candidates come back in (i, j) order with i < j. Each text is
    /// tokenized once; rows are spread across the rayon pool.
    pub fn classify_all(&self, documents: &[Document]) -> Vec<RelationshipCandidate> {
        let prepared: Vec<PreparedText<'_>> = documents
            .iter()
            .map(|d| PreparedText::new(&d.content))
            .collect();
        let n = prepared.len();

        (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let prepared = &prepared;
                ((i + 1)..n).filter_map(move |j| {
                    self.classify_prepared(documents[i].id, &prepared[i], documents[j].id, &prepared[j])
                })
            })
            .collect()
    }

    /// Classify two raw texts identified by document id
    pub fn classify_texts(
        &self,
        a_id: DocumentId,
        a: &str,
        b_id: DocumentId,
        b: &str,
    ) -> Option<RelationshipCandidate> {
        self.classify_prepared(a_id, &PreparedText::new(a), b_id, &PreparedText::new(b))
    }

    /// Classify two pre-tokenized texts
    pub fn classify_prepared(
        &self,
        a_id: DocumentId,
        a: &PreparedText<'_>,
        b_id: DocumentId,
        b: &PreparedText<'_>,
    ) -> Option<RelationshipCandidate> {
        let score = a.similarity(b);

        if score > self.config.redundancy_threshold {
            tracing::debug!("Pair ({}, {}) redundant at {:.3}", a_id, b_id, score);
            return Some(RelationshipCandidate::new(
                a_id,
                b_id,
                RelationshipKind::Redundant,
                Some(score),
                format!(
                    "High content similarity detected ({:.2}). Documents may be redundant.",
                    score
                ),
                DetectionMethod::SimilarityAnalysis,
            ));
        }

        if score > self.config.conflict_threshold
            && self.has_conflict_signature(a.lowered(), b.lowered())
        {
            tracing::debug!("Pair ({}, {}) conflicting at {:.3}", a_id, b_id, score);
            return Some(RelationshipCandidate::new(
                a_id,
                b_id,
                RelationshipKind::Conflicting(KEYWORD_CONFLICT_SEVERITY),
                Some(score),
                "Potential conflict detected based on overlapping scope with conflicting requirements."
                    .to_string(),
                DetectionMethod::KeywordConflictAnalysis,
            ));
        }

        None
    }

    /// Whether one text prohibits what the other requires
    ///
    /// Both inputs must already be lower-cased.
    pub fn has_conflict_signature(&self, a: &str, b: &str) -> bool {
        let negative = |text: &str| self.negative_terms.iter().any(|t| text.contains(t.as_str()));
        let positive = |text: &str| self.positive_terms.iter().any(|t| text.contains(t.as_str()));

        (negative(a) && positive(b)) || (negative(b) && positive(a))
    }
}
