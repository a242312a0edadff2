//! All-pairs duplicate discovery
//!
//! A read-only report: the scanner never consults or writes relationships.

use crate::similarity::PreparedText;
use crate::{AnalysisError, DetectionConfig};
use rayon::prelude::*;
use reglens_domain::traits::DocumentStore;
use reglens_domain::{Document, DocumentKey, PartitionId};
use std::fmt;

/// Human-readable band for a duplicate score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimilarityBand {
    /// At or above the near-identical cut-off
    NearIdentical,
    /// At or above the high-similarity cut-off
    High,
    /// Anything else that met the scan threshold
    Moderate,
}

impl SimilarityBand {
    /// Reason text shown next to a duplicate pair
    pub fn description(&self) -> &'static str {
        match self {
            SimilarityBand::NearIdentical => "near identical",
            SimilarityBand::High => "high similarity",
            SimilarityBand::Moderate => "moderate similarity",
        }
    }
}

impl fmt::Display for SimilarityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// One pair of documents meeting the scan threshold
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicatePair {
    /// Earlier document in scan order
    pub first: DocumentKey,
    /// Later document in scan order
    pub second: DocumentKey,
    /// Content similarity in [0.0, 1.0]
    pub score: f64,
    /// Reason band for `score`
    pub band: SimilarityBand,
}

/// Finds every unordered pair of documents whose similarity meets a threshold
///
/// Pairs are emitted in (i, j) order with i < j over the input sequence.
/// Rows are spread across the rayon pool; output order is unaffected.
#[derive(Debug, Clone)]
pub struct DuplicateScanner {
    near_identical_cutoff: f64,
    high_similarity_cutoff: f64,
}

impl Default for DuplicateScanner {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl DuplicateScanner {
    /// Scanner using the band cut-offs from `config`
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            near_identical_cutoff: config.near_identical_cutoff,
            high_similarity_cutoff: config.high_similarity_cutoff,
        }
    }

    /// Band for a score
    pub fn band(&self, score: f64) -> SimilarityBand {
        if score >= self.near_identical_cutoff {
            SimilarityBand::NearIdentical
        } else if score >= self.high_similarity_cutoff {
            SimilarityBand::High
        } else {
            SimilarityBand::Moderate
        }
    }

    /// Scan `documents` for pairs scoring at or above `threshold`
    pub fn scan(
        &self,
        documents: &[Document],
        threshold: f64,
    ) -> Result<Vec<DuplicatePair>, AnalysisError> {
        if threshold.is_nan() || !(0.0..=1.0).contains(&threshold) {
            return Err(AnalysisError::InvalidThreshold(threshold));
        }

        let prepared: Vec<PreparedText<'_>> = documents
            .iter()
            .map(|d| PreparedText::new(&d.content))
            .collect();
        let n = prepared.len();

        let pairs: Vec<DuplicatePair> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let prepared = &prepared;
                ((i + 1)..n).filter_map(move |j| {
                    let score = prepared[i].similarity(&prepared[j]);
                    (score >= threshold).then(|| DuplicatePair {
                        first: documents[i].key.clone(),
                        second: documents[j].key.clone(),
                        score,
                        band: self.band(score),
                    })
                })
            })
            .collect();

        tracing::debug!(
            "Duplicate scan over {} documents found {} pairs at threshold {}",
            n,
            pairs.len(),
            threshold
        );
        Ok(pairs)
    }

    /// Load documents from `store` (one partition, or the whole corpus) and scan them
    pub fn scan_store<S>(
        &self,
        store: &S,
        partition: Option<PartitionId>,
        threshold: f64,
    ) -> Result<Vec<DuplicatePair>, AnalysisError>
    where
        S: DocumentStore,
        S::Error: fmt::Display,
    {
        let documents = match partition {
            Some(partition) => store.documents_in_partition(partition),
            None => store.all_documents(),
        }
        .map_err(|e| AnalysisError::Store(e.to_string()))?;

        if documents.len() > 5_000 {
            tracing::warn!(
                "Duplicate scan over {} documents; consider scoping to a partition",
                documents.len()
            );
        }

        self.scan(&documents, threshold)
    }
}
