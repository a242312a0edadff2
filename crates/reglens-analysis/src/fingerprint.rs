//! Content fingerprints and word counts
//!
//! The fingerprint is SHA-256 over the UTF-8 bytes of the text, rendered
//! as 64 lowercase hex characters. There is no fallback algorithm: if the
//! digest ever disagrees with the published test vectors, [`self_test`]
//! fails and callers must stop.

use crate::AnalysisError;
use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters
pub const FINGERPRINT_LEN: usize = 64;

/// Compute the content fingerprint of `text`
///
/// # Examples
///
/// ```
/// use reglens_analysis::fingerprint;
///
/// let digest = fingerprint("The rate shall be 5%.");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, fingerprint("The rate shall be 5%."));
/// ```
pub fn fingerprint(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Count maximal runs of non-whitespace characters
///
/// Empty and whitespace-only text has zero words.
pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Verify the digest against published SHA-256 vectors
///
/// Run once at startup so a broken digest surfaces before any scan.
pub fn self_test() -> Result<(), AnalysisError> {
    const VECTORS: [(&str, &str); 2] = [
        ("", "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"),
        ("abc", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"),
    ];

    for (input, expected) in VECTORS {
        let actual = fingerprint(input);
        if actual != expected {
            return Err(AnalysisError::Fingerprint(format!(
                "digest of {:?} was {}, expected {}",
                input, actual, expected
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_test_passes() {
        assert!(self_test().is_ok());
    }

    #[test]
    fn test_fingerprint_shape() {
        let digest = fingerprint("Permits are required for all activities.");
        assert_eq!(digest.len(), FINGERPRINT_LEN);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_distinguishes_small_edits() {
        assert_ne!(
            fingerprint("The rate shall be 5%."),
            fingerprint("The rate shall be 5% annually.")
        );
        assert_ne!(fingerprint("a"), fingerprint("a "));
    }

    #[test]
    fn test_fingerprint_unicode() {
        assert_ne!(fingerprint("café"), fingerprint("cafe"));
        assert_eq!(fingerprint("§ 1910.1"), fingerprint("§ 1910.1"));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("  The rate\tshall\n be 5%.  "), 5);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: fingerprint is deterministic
        #[test]
        fn test_fingerprint_deterministic(text in ".*") {
            prop_assert_eq!(fingerprint(&text), fingerprint(&text));
        }

        /// Property: distinct inputs give distinct digests
        #[test]
        fn test_fingerprint_distinct(a in ".{0,40}", b in ".{0,40}") {
            prop_assume!(a != b);
            prop_assert_ne!(fingerprint(&a), fingerprint(&b));
        }

        /// Property: word count never exceeds character count
        #[test]
        fn test_word_count_bounded(text in ".{0,200}") {
            prop_assert!(word_count(&text) as usize <= text.chars().count());
        }
    }
}
