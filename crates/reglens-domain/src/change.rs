//! Change module - classification of a proposed document update

use std::fmt;

/// Outcome of comparing a proposed document against the stored version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// No stored document exists for the key
    New,

    /// Content and metadata are unchanged
    NoChange,

    /// Content fingerprint differs
    ContentChanged,

    /// Content is unchanged but title or agency differs
    MetadataChanged,
}

impl ChangeKind {
    /// Code used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::New => "NEW",
            ChangeKind::NoChange => "NO_CHANGE",
            ChangeKind::ContentChanged => "CONTENT_CHANGED",
            ChangeKind::MetadataChanged => "METADATA_CHANGED",
        }
    }

    /// Whether the proposed version should be persisted
    pub fn requires_write(&self) -> bool {
        !matches!(self, ChangeKind::NoChange)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Old and new value of a single metadata field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Stored value
    pub old: String,
    /// Proposed value
    pub new: String,
}

/// Size and similarity delta between old and new content
#[derive(Debug, Clone, PartialEq)]
pub struct ContentChange {
    /// Stored content length in characters
    pub old_length: usize,

    /// Proposed content length in characters
    pub new_length: usize,

    /// Stored word count
    pub old_word_count: u64,

    /// Proposed word count
    pub new_word_count: u64,

    /// Word-set similarity scaled to 0-100
    pub similarity_percentage: f64,
}

/// Detailed delta, populated only for content changes
///
/// Title and agency entries appear only when those fields also differ.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDetails {
    /// Title delta
    pub title: Option<FieldChange>,

    /// Agency delta
    pub agency: Option<FieldChange>,

    /// Content delta
    pub content: ContentChange,
}

/// Result of change detection for one document key
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeResult {
    /// Classification
    pub kind: ChangeKind,

    /// Fingerprint of the stored content, if a document was stored
    pub previous_fingerprint: Option<String>,

    /// Fingerprint of the proposed content, if it was computed
    pub new_fingerprint: Option<String>,

    /// Human-readable description
    pub description: String,

    /// Detailed delta for content changes
    pub details: Option<ChangeDetails>,
}

impl ChangeResult {
    /// Result for a key with no stored document
    pub fn new_document() -> Self {
        Self {
            kind: ChangeKind::New,
            previous_fingerprint: None,
            new_fingerprint: None,
            description: "New document - no existing record found".to_string(),
            details: None,
        }
    }
}
