//! Change detection against the stored version of a document

use crate::fingerprint::{fingerprint, word_count};
use crate::similarity::similarity;
use crate::AnalysisError;
use reglens_domain::traits::DocumentStore;
use reglens_domain::{
    ChangeDetails, ChangeKind, ChangeResult, ContentChange, Document, DocumentId, DocumentKey,
    FieldChange, PartitionId,
};
use std::collections::BTreeMap;

/// A proposed version of a document
#[derive(Debug, Clone, Copy)]
pub struct ProposedDocument<'a> {
    /// Proposed title
    pub title: &'a str,

    /// Proposed content
    pub content: &'a str,

    /// Proposed agency name
    pub agency_name: &'a str,
}

/// Classify a proposed version against the stored one
///
/// Content is authoritative: a fingerprint mismatch yields
/// `ContentChanged` even when metadata also changed. Metadata changes are
/// reported only when content is unchanged, title before agency.
pub fn classify_change(existing: Option<&Document>, proposed: ProposedDocument<'_>) -> ChangeResult {
    let Some(existing) = existing else {
        return ChangeResult::new_document();
    };

    let stored_fingerprint = fingerprint(&existing.content);
    if stored_fingerprint != existing.content_fingerprint {
        tracing::warn!(
            "Stored fingerprint for {} does not match its content; using recomputed value",
            existing.key
        );
    }

    let new_fingerprint = fingerprint(proposed.content);

    let (kind, description, details) = if new_fingerprint != stored_fingerprint {
        (
            ChangeKind::ContentChanged,
            "Content fingerprint changed",
            Some(content_details(existing, proposed)),
        )
    } else if existing.title != proposed.title {
        (
            ChangeKind::MetadataChanged,
            "Title changed but content remained the same",
            None,
        )
    } else if existing.agency_name != proposed.agency_name {
        (
            ChangeKind::MetadataChanged,
            "Agency name changed but content remained the same",
            None,
        )
    } else {
        (ChangeKind::NoChange, "No changes detected", None)
    };

    ChangeResult {
        kind,
        previous_fingerprint: Some(stored_fingerprint),
        new_fingerprint: Some(new_fingerprint),
        description: description.to_string(),
        details,
    }
}

fn field_change(old: &str, new: &str) -> Option<FieldChange> {
    (old != new).then(|| FieldChange {
        old: old.to_string(),
        new: new.to_string(),
    })
}

fn content_details(existing: &Document, proposed: ProposedDocument<'_>) -> ChangeDetails {
    ChangeDetails {
        title: field_change(&existing.title, proposed.title),
        agency: field_change(&existing.agency_name, proposed.agency_name),
        content: ContentChange {
            old_length: existing.content.chars().count(),
            new_length: proposed.content.chars().count(),
            old_word_count: word_count(&existing.content),
            new_word_count: word_count(proposed.content),
            similarity_percentage: similarity(&existing.content, proposed.content) * 100.0,
        },
    }
}

/// Change detector bound to a document store
///
/// Pure classifier: it reads the stored version and never writes.
///
/// # Examples
///
/// ```ignore
/// let detector = ChangeDetector::new(&store);
/// let result = detector.detect(&key, ProposedDocument { title, content, agency_name })?;
/// if result.kind.requires_write() { /* persist the new version */ }
/// ```
pub struct ChangeDetector<'s, S> {
    store: &'s S,
}

impl<'s, S> ChangeDetector<'s, S>
where
    S: DocumentStore,
    S::Error: std::fmt::Display,
{
    /// Create a detector reading from `store`
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Classify a proposed version of the document at `key`
    pub fn detect(
        &self,
        key: &DocumentKey,
        proposed: ProposedDocument<'_>,
    ) -> Result<ChangeResult, AnalysisError> {
        tracing::debug!("Detecting changes for {}", key);

        let existing = self
            .store
            .get_document(key)
            .map_err(|e| AnalysisError::Store(e.to_string()))?;

        let result = classify_change(existing.as_ref(), proposed);
        tracing::debug!("{} classified as {}", key, result.kind);
        Ok(result)
    }
}

/// Documents updated since a point in time, grouped for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeReport {
    /// Start of the analysis period (Unix seconds)
    pub since: u64,

    /// Number of updated documents
    pub total_changes: usize,

    /// Updated documents per agency
    pub by_agency: BTreeMap<String, usize>,

    /// Updated documents per partition
    pub by_partition: BTreeMap<PartitionId, usize>,

    /// Keys and update times, most recent first
    pub recent: Vec<(DocumentKey, u64)>,
}

/// Build a change report for every document updated at or after `since`
pub fn change_report<S>(store: &S, since: u64) -> Result<ChangeReport, AnalysisError>
where
    S: DocumentStore,
    S::Error: std::fmt::Display,
{
    tracing::info!("Generating change report since {}", since);

    let documents = store
        .documents_updated_since(since)
        .map_err(|e| AnalysisError::Store(e.to_string()))?;

    let mut by_agency = BTreeMap::new();
    let mut by_partition = BTreeMap::new();
    for doc in &documents {
        *by_agency.entry(doc.agency_name.clone()).or_insert(0) += 1;
        *by_partition.entry(doc.key.partition).or_insert(0) += 1;
    }

    let mut recent: Vec<(DocumentKey, u64)> = documents
        .iter()
        .map(|d| (d.key.clone(), d.updated_at))
        .collect();
    recent.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(ChangeReport {
        since,
        total_changes: documents.len(),
        by_agency,
        by_partition,
        recent,
    })
}

/// Updates this soon after creation still count as the creation itself
pub const CREATION_WINDOW_SECS: u64 = 60;

/// How a history entry came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    /// First stored version
    Created,
    /// Stored version replaced by a later one
    Updated,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HistoryAction::Created => "CREATED",
            HistoryAction::Updated => "UPDATED",
        })
    }
}

/// One recorded change of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeHistoryEntry {
    /// Document that changed
    pub document: DocumentId,

    /// When the change was stored (Unix seconds)
    pub changed_at: u64,

    /// Content fingerprint after the change
    pub fingerprint: String,

    /// Word count after the change
    pub word_count: u64,

    /// Creation or update
    pub action: HistoryAction,
}

impl ChangeHistoryEntry {
    fn from_document(doc: &Document) -> Self {
        let action = if doc.updated_at.saturating_sub(doc.created_at) < CREATION_WINDOW_SECS {
            HistoryAction::Created
        } else {
            HistoryAction::Updated
        };
        Self {
            document: doc.id,
            changed_at: doc.updated_at,
            fingerprint: doc.content_fingerprint.clone(),
            word_count: doc.word_count,
            action,
        }
    }
}

/// Changes to `key` stored at or after `since`, most recent first
///
/// Only the latest version of a document is kept, so a key yields at most
/// one entry per stored record.
pub fn change_history<S>(
    store: &S,
    key: &DocumentKey,
    since: u64,
) -> Result<Vec<ChangeHistoryEntry>, AnalysisError>
where
    S: DocumentStore,
    S::Error: std::fmt::Display,
{
    tracing::debug!("Collecting change history for {} since {}", key, since);

    let mut history: Vec<ChangeHistoryEntry> = store
        .documents_updated_since(since)
        .map_err(|e| AnalysisError::Store(e.to_string()))?
        .iter()
        .filter(|doc| &doc.key == key)
        .map(ChangeHistoryEntry::from_document)
        .collect();
    history.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStore {
        documents: Vec<Document>,
    }

    impl DocumentStore for MockStore {
        type Error = String;

        fn get_document(&self, key: &DocumentKey) -> Result<Option<Document>, Self::Error> {
            Ok(self.documents.iter().find(|d| &d.key == key).cloned())
        }

        fn documents_in_partition(&self, partition: PartitionId) -> Result<Vec<Document>, Self::Error> {
            Ok(self.documents.iter().filter(|d| d.key.partition == partition).cloned().collect())
        }

        fn all_documents(&self) -> Result<Vec<Document>, Self::Error> {
            Ok(self.documents.clone())
        }

        fn documents_updated_since(&self, since: u64) -> Result<Vec<Document>, Self::Error> {
            Ok(self.documents.iter().filter(|d| d.updated_at >= since).cloned().collect())
        }
    }

    struct FailingStore;

    impl DocumentStore for FailingStore {
        type Error = String;

        fn get_document(&self, _key: &DocumentKey) -> Result<Option<Document>, Self::Error> {
            Err("connection lost".to_string())
        }

        fn documents_in_partition(&self, _p: PartitionId) -> Result<Vec<Document>, Self::Error> {
            Err("connection lost".to_string())
        }

        fn all_documents(&self) -> Result<Vec<Document>, Self::Error> {
            Err("connection lost".to_string())
        }

        fn documents_updated_since(&self, _since: u64) -> Result<Vec<Document>, Self::Error> {
            Err("connection lost".to_string())
        }
    }

    fn key(partition: i64, part: &str) -> DocumentKey {
        DocumentKey::new(PartitionId::new(partition).unwrap(), part)
    }

    fn stored(id: u64, key: DocumentKey, title: &str, content: &str, agency: &str, updated_at: u64) -> Document {
        Document {
            id: DocumentId::from_value(id),
            key,
            title: title.to_string(),
            content: content.to_string(),
            agency_name: agency.to_string(),
            content_fingerprint: fingerprint(content),
            word_count: word_count(content),
            created_at: 100,
            updated_at,
        }
    }

    fn proposed<'a>(title: &'a str, content: &'a str, agency_name: &'a str) -> ProposedDocument<'a> {
        ProposedDocument { title, content, agency_name }
    }

    fn store_with_rate_rule() -> MockStore {
        MockStore {
            documents: vec![stored(1, key(12, "1"), "Rates", "The rate shall be 5%.", "Treasury", 500)],
        }
    }

    #[test]
    fn test_new_when_missing() {
        let store = store_with_rate_rule();
        let detector = ChangeDetector::new(&store);
        let result = detector
            .detect(&key(12, "2"), proposed("Rates", "The rate shall be 5%.", "Treasury"))
            .unwrap();
        assert_eq!(result.kind, ChangeKind::New);
        assert!(result.previous_fingerprint.is_none());
        assert!(result.new_fingerprint.is_none());
    }

    #[test]
    fn test_no_change_for_identical_content() {
        let store = store_with_rate_rule();
        let detector = ChangeDetector::new(&store);
        let result = detector
            .detect(&key(12, "1"), proposed("Rates", "The rate shall be 5%.", "Treasury"))
            .unwrap();
        assert_eq!(result.kind, ChangeKind::NoChange);
        assert_eq!(result.previous_fingerprint, result.new_fingerprint);
        assert!(result.details.is_none());
    }

    #[test]
    fn test_content_changed_populates_details() {
        let store = store_with_rate_rule();
        let detector = ChangeDetector::new(&store);
        let result = detector
            .detect(
                &key(12, "1"),
                proposed("Rates", "The rate shall be 5% annually.", "Treasury"),
            )
            .unwrap();

        assert_eq!(result.kind, ChangeKind::ContentChanged);
        assert_ne!(result.previous_fingerprint, result.new_fingerprint);

        let details = result.details.expect("content change carries details");
        assert!(details.title.is_none());
        assert!(details.agency.is_none());
        assert_eq!(details.content.old_length, 21);
        assert_eq!(details.content.new_length, 30);
        assert_eq!(details.content.old_word_count, 5);
        assert_eq!(details.content.new_word_count, 6);
        assert!(details.content.similarity_percentage > 0.0);
        assert!(details.content.similarity_percentage < 100.0);
    }

    #[test]
    fn test_content_change_wins_over_metadata() {
        let store = store_with_rate_rule();
        let result = classify_change(
            store.documents.first(),
            proposed("Interest Rates", "Completely different text.", "IRS"),
        );
        assert_eq!(result.kind, ChangeKind::ContentChanged);
        let details = result.details.unwrap();
        assert_eq!(
            details.title,
            Some(FieldChange { old: "Rates".to_string(), new: "Interest Rates".to_string() })
        );
        assert_eq!(
            details.agency,
            Some(FieldChange { old: "Treasury".to_string(), new: "IRS".to_string() })
        );
    }

    #[test]
    fn test_title_only_change() {
        let store = store_with_rate_rule();
        let result = classify_change(
            store.documents.first(),
            proposed("Rate Rules", "The rate shall be 5%.", "IRS"),
        );
        assert_eq!(result.kind, ChangeKind::MetadataChanged);
        assert!(result.description.starts_with("Title changed"));
        assert!(result.details.is_none());
    }

    #[test]
    fn test_agency_only_change() {
        let store = store_with_rate_rule();
        let result = classify_change(
            store.documents.first(),
            proposed("Rates", "The rate shall be 5%.", "IRS"),
        );
        assert_eq!(result.kind, ChangeKind::MetadataChanged);
        assert!(result.description.starts_with("Agency name changed"));
    }

    #[test]
    fn test_content_cleared() {
        let store = store_with_rate_rule();
        let result = classify_change(store.documents.first(), proposed("Rates", "", "Treasury"));
        assert_eq!(result.kind, ChangeKind::ContentChanged);
        let content = result.details.unwrap().content;
        assert_eq!(content.new_length, 0);
        assert_eq!(content.new_word_count, 0);
        assert_eq!(content.similarity_percentage, 0.0);
    }

    #[test]
    fn test_store_failure_propagates() {
        let detector = ChangeDetector::new(&FailingStore);
        let err = detector
            .detect(&key(1, "1"), proposed("t", "c", "a"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Store(_)));
    }

    #[test]
    fn test_change_report_groups() {
        let store = MockStore {
            documents: vec![
                stored(1, key(12, "1"), "A", "a", "Treasury", 500),
                stored(2, key(12, "2"), "B", "b", "Treasury", 900),
                stored(3, key(40, "60"), "C", "c", "EPA", 800),
                stored(4, key(40, "61"), "D", "d", "EPA", 100),
            ],
        };

        let report = change_report(&store, 400).unwrap();
        assert_eq!(report.total_changes, 3);
        assert_eq!(report.by_agency.get("Treasury"), Some(&2));
        assert_eq!(report.by_agency.get("EPA"), Some(&1));
        assert_eq!(report.by_partition.get(&PartitionId::new(12).unwrap()), Some(&2));
        assert_eq!(report.recent.first().map(|(k, _)| k.clone()), Some(key(12, "2")));
    }

    #[test]
    fn test_change_history_distinguishes_creation_from_update() {
        let store = MockStore {
            documents: vec![
                stored(1, key(12, "1"), "A", "The rate shall be 5%.", "Treasury", 130),
                stored(2, key(12, "2"), "B", "b", "Treasury", 900),
            ],
        };

        let created = change_history(&store, &key(12, "1"), 0).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].action, HistoryAction::Created);
        assert_eq!(created[0].document, DocumentId::from_value(1));
        assert_eq!(created[0].changed_at, 130);
        assert_eq!(created[0].word_count, 5);
        assert_eq!(created[0].fingerprint, fingerprint("The rate shall be 5%."));

        let updated = change_history(&store, &key(12, "2"), 0).unwrap();
        assert_eq!(updated[0].action, HistoryAction::Updated);
        assert_eq!(updated[0].action.to_string(), "UPDATED");
    }

    #[test]
    fn test_change_history_respects_window_and_key() {
        let store = MockStore {
            documents: vec![
                stored(1, key(12, "1"), "A", "a", "Treasury", 160),
                stored(2, key(12, "2"), "B", "b", "Treasury", 900),
            ],
        };

        // 60 seconds after creation is already an update
        assert_eq!(change_history(&store, &key(12, "1"), 0).unwrap()[0].action, HistoryAction::Updated);
        assert!(change_history(&store, &key(12, "1"), 500).unwrap().is_empty());
        assert!(change_history(&store, &key(13, "1"), 0).unwrap().is_empty());
        assert!(matches!(
            change_history(&FailingStore, &key(12, "1"), 0),
            Err(AnalysisError::Store(_))
        ));
    }
}
