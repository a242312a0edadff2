//! Word-set similarity
//!
//! Texts are lower-cased, split on whitespace runs and reduced to sets;
//! the score is the Jaccard index of the two sets. Word order, frequency
//! and position are ignored.

use std::collections::HashSet;

/// Lower-cased set of whitespace-delimited words in `text`
pub fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard index |A ∩ B| / |A ∪ B|, or 0.0 when both sets are empty
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|w| large.contains(*w)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Similarity of two texts in [0.0, 1.0]
///
/// - identical texts (including two empty texts) score 1.0
/// - exactly one empty text scores 0.0
/// - otherwise the Jaccard index of the lower-cased word sets
///
/// # Examples
///
/// ```
/// use reglens_analysis::similarity;
///
/// assert_eq!(similarity("", ""), 1.0);
/// assert_eq!(similarity("", "text"), 0.0);
/// assert_eq!(similarity("Shall file", "file SHALL"), 1.0);
/// assert_eq!(similarity("a b", "b c"), 1.0 / 3.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    if let Some(score) = short_circuit(a, b) {
        return score;
    }
    jaccard(&word_set(a), &word_set(b))
}

fn short_circuit(a: &str, b: &str) -> Option<f64> {
    if a == b {
        Some(1.0)
    } else if a.is_empty() || b.is_empty() {
        Some(0.0)
    } else {
        None
    }
}

/// A text with its lower-cased form and word set computed once
///
/// Pairwise scans build one of these per document and reuse it for every
/// pair, so each text is tokenized exactly once.
#[derive(Debug, Clone)]
pub struct PreparedText<'a> {
    raw: &'a str,
    lowered: String,
    words: HashSet<String>,
}

impl<'a> PreparedText<'a> {
    /// Tokenize `raw`
    pub fn new(raw: &'a str) -> Self {
        let lowered = raw.to_lowercase();
        let words = lowered.split_whitespace().map(str::to_string).collect();
        Self { raw, lowered, words }
    }

    /// Original text
    pub fn raw(&self) -> &str {
        self.raw
    }

    /// Lower-cased text, for substring matching
    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    /// Lower-cased word set
    pub fn words(&self) -> &HashSet<String> {
        &self.words
    }

    /// Same result as [`similarity`] on the two raw texts
    pub fn similarity(&self, other: &PreparedText<'_>) -> f64 {
        if let Some(score) = short_circuit(self.raw, other.raw) {
            return score;
        }
        jaccard(&self.words, &other.words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("", "non-empty"), 0.0);
        assert_eq!(similarity("non-empty", ""), 0.0);
    }

    #[test]
    fn test_whitespace_only_texts() {
        // Different whitespace-only texts share no words
        assert_eq!(similarity(" ", "  "), 0.0);
        assert_eq!(similarity(" ", "word"), 0.0);
    }

    #[test]
    fn test_case_and_order_insensitive() {
        assert_eq!(similarity("Permits are REQUIRED", "required permits are"), 1.0);
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(similarity("fee fee fee", "fee"), 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        // {the, rate, shall, be, 5%.} vs {the, rate, shall, be, 5%, annually.}
        let score = similarity("The rate shall be 5%.", "The rate shall be 5% annually.");
        assert!((score - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint() {
        assert_eq!(similarity("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn test_prepared_matches_plain() {
        let pairs = [
            ("", ""),
            ("", "x"),
            ("A b c", "c d"),
            ("Operators must file reports annually.", "Operators shall not file reports."),
        ];
        for (a, b) in pairs {
            let pa = PreparedText::new(a);
            let pb = PreparedText::new(b);
            assert_eq!(pa.similarity(&pb), similarity(a, b));
        }
    }

    #[test]
    fn test_prepared_lowered() {
        let text = PreparedText::new("Shall NOT");
        assert_eq!(text.lowered(), "shall not");
        assert_eq!(text.raw(), "Shall NOT");
        assert_eq!(text.words().len(), 2);
    }
}
