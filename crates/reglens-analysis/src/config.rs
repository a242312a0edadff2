//! Detection configuration
//!
//! Every threshold and term list used by the classifier and the duplicate
//! scanner lives here and is passed in explicitly.

use crate::AnalysisError;
use serde::{Deserialize, Serialize};

/// Configuration for relationship classification and duplicate banding
///
/// # Examples
///
/// ```
/// use reglens_analysis::DetectionConfig;
///
/// let config = DetectionConfig::default();
/// assert_eq!(config.redundancy_threshold, 0.70);
/// assert_eq!(config.conflict_threshold, 0.30);
/// assert!(config.validate().is_ok());
///
/// let strict = DetectionConfig::strict();
/// assert!(strict.redundancy_threshold > config.redundancy_threshold);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Pairs scoring strictly above this are redundant
    /// Default: 0.70
    pub redundancy_threshold: f64,

    /// Pairs scoring strictly above this (and not redundant) are checked
    /// for a conflict signature
    /// Default: 0.30
    pub conflict_threshold: f64,

    /// Negative-obligation terms, matched as case-insensitive substrings
    pub negative_terms: Vec<String>,

    /// Positive-obligation terms, matched as case-insensitive substrings
    pub positive_terms: Vec<String>,

    /// Duplicate scores at or above this are "near identical"
    /// Default: 0.95
    pub near_identical_cutoff: f64,

    /// Duplicate scores at or above this are "high similarity"
    /// Default: 0.80
    pub high_similarity_cutoff: f64,
}

fn terms(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn default_negative_terms() -> Vec<String> {
    terms(&["shall not", "prohibited", "forbidden", "must not", "except", "unless"])
}

fn default_positive_terms() -> Vec<String> {
    terms(&["shall", "must", "required", "mandatory"])
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            redundancy_threshold: 0.70,
            conflict_threshold: 0.30,
            negative_terms: default_negative_terms(),
            positive_terms: default_positive_terms(),
            near_identical_cutoff: 0.95,
            high_similarity_cutoff: 0.80,
        }
    }
}

impl DetectionConfig {
    /// Strict preset: fewer, higher-confidence candidates
    pub fn strict() -> Self {
        Self {
            redundancy_threshold: 0.85,
            conflict_threshold: 0.45,
            ..Self::default()
        }
    }

    /// Lenient preset: more candidates for human review
    pub fn lenient() -> Self {
        Self {
            redundancy_threshold: 0.60,
            conflict_threshold: 0.20,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(AnalysisError::Config(format!(
                    "{} must be in [0.0, 1.0], got {}",
                    name, value
                )))
            }
        };

        unit("redundancy_threshold", self.redundancy_threshold)?;
        unit("conflict_threshold", self.conflict_threshold)?;
        unit("near_identical_cutoff", self.near_identical_cutoff)?;
        unit("high_similarity_cutoff", self.high_similarity_cutoff)?;

        if self.conflict_threshold > self.redundancy_threshold {
            return Err(AnalysisError::Config(
                "conflict_threshold cannot exceed redundancy_threshold".to_string(),
            ));
        }
        if self.high_similarity_cutoff > self.near_identical_cutoff {
            return Err(AnalysisError::Config(
                "high_similarity_cutoff cannot exceed near_identical_cutoff".to_string(),
            ));
        }
        if self.negative_terms.iter().all(|t| t.trim().is_empty()) {
            return Err(AnalysisError::Config("negative_terms must not be empty".to_string()));
        }
        if self.positive_terms.iter().all(|t| t.trim().is_empty()) {
            return Err(AnalysisError::Config("positive_terms must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectionConfig::default();
        assert_eq!(config.redundancy_threshold, 0.70);
        assert_eq!(config.conflict_threshold, 0.30);
        assert_eq!(config.near_identical_cutoff, 0.95);
        assert_eq!(config.high_similarity_cutoff, 0.80);
        assert!(config.negative_terms.contains(&"shall not".to_string()));
        assert!(config.positive_terms.contains(&"mandatory".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(DetectionConfig::strict().validate().is_ok());
        assert!(DetectionConfig::lenient().validate().is_ok());
        assert!(DetectionConfig::lenient().conflict_threshold < DetectionConfig::default().conflict_threshold);
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let config = DetectionConfig {
            redundancy_threshold: 0.2,
            conflict_threshold: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = DetectionConfig {
            redundancy_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_terms() {
        let config = DetectionConfig {
            positive_terms: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DetectionConfig = toml::from_str("redundancy_threshold = 0.9").unwrap();
        assert_eq!(config.redundancy_threshold, 0.9);
        assert_eq!(config.conflict_threshold, 0.30);
        assert_eq!(config.negative_terms, default_negative_terms());
    }
}
