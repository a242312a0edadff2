//! Bulk detection scenarios against a real SQLite store

use reglens_analysis::RelationshipClassifier;
use reglens_domain::traits::{DocumentStore, RelationshipStore};
use reglens_domain::{
    Document, DocumentId, DocumentKey, PartitionId, Relationship, RelationshipCandidate,
    RelationshipType,
};
use reglens_store::SqliteStore;
use reglens_sweep::{BulkOrchestrator, PartitionOutcome, SweepConfig, SweepError};
use std::sync::Arc;

fn partition(n: i64) -> PartitionId {
    PartitionId::new(n).unwrap()
}

fn seed(store: &SqliteStore) {
    let docs = [
        (1, "100", "Permits are required for all activities."),
        (1, "101", "Permits are required for all activities."),
        (1, "102", "Fishing season opens in May."),
        (2, "200", "Reports are due quarterly."),
        (2, "201", "Reports are due quarterly."),
        (3, "300", "Vessels must carry a permit in coastal waters."),
        (3, "301", "Vessels must not carry a permit in inland waters."),
    ];
    for (p, part, content) in docs {
        store
            .upsert_document_at(&DocumentKey::new(partition(p), part), "Title", content, "Agency", 1)
            .unwrap();
    }
}

/// Store that fails the fetch of one partition or the writes touching one document
struct FlakyStore {
    inner: SqliteStore,
    failing: Option<PartitionId>,
    rejected: Option<DocumentId>,
}

impl FlakyStore {
    fn new(inner: SqliteStore) -> Self {
        Self { inner, failing: None, rejected: None }
    }
}

impl DocumentStore for FlakyStore {
    type Error = String;

    fn get_document(&self, key: &DocumentKey) -> Result<Option<Document>, Self::Error> {
        self.inner.get_document(key).map_err(|e| e.to_string())
    }

    fn documents_in_partition(&self, p: PartitionId) -> Result<Vec<Document>, Self::Error> {
        if Some(p) == self.failing {
            return Err(format!("timeout fetching partition {}", p));
        }
        self.inner.documents_in_partition(p).map_err(|e| e.to_string())
    }

    fn all_documents(&self) -> Result<Vec<Document>, Self::Error> {
        self.inner.all_documents().map_err(|e| e.to_string())
    }

    fn documents_updated_since(&self, since: u64) -> Result<Vec<Document>, Self::Error> {
        self.inner.documents_updated_since(since).map_err(|e| e.to_string())
    }
}

impl RelationshipStore for FlakyStore {
    type Error = String;

    fn find_relationship(&self, a: DocumentId, b: DocumentId) -> Result<Option<Relationship>, Self::Error> {
        self.inner.find_relationship(a, b).map_err(|e| e.to_string())
    }

    fn create_relationship(
        &self,
        candidate: RelationshipCandidate,
        detected_at: u64,
    ) -> Result<Relationship, Self::Error> {
        if let Some(rejected) = self.rejected {
            if candidate.source == rejected || candidate.target == rejected {
                return Err("disk I/O error".to_string());
            }
        }
        self.inner
            .create_relationship(candidate, detected_at)
            .map_err(|e| e.to_string())
    }

    fn relationships_for_document(&self, id: DocumentId) -> Result<Vec<Relationship>, Self::Error> {
        self.inner.relationships_for_document(id).map_err(|e| e.to_string())
    }

    fn all_relationships(&self) -> Result<Vec<Relationship>, Self::Error> {
        self.inner.all_relationships().map_err(|e| e.to_string())
    }
}

fn orchestrator<S>(store: Arc<S>, config: SweepConfig) -> BulkOrchestrator<S>
where
    S: DocumentStore + RelationshipStore + Send + Sync + 'static,
    <S as DocumentStore>::Error: std::fmt::Display,
    <S as RelationshipStore>::Error: std::fmt::Display,
{
    BulkOrchestrator::new(store, RelationshipClassifier::default_config(), config)
}

#[tokio::test]
async fn test_failed_partition_is_isolated() {
    let inner = SqliteStore::in_memory().unwrap();
    seed(&inner);
    let store = Arc::new(FlakyStore { failing: Some(partition(2)), ..FlakyStore::new(inner) });

    let result = orchestrator(store.clone(), SweepConfig::default())
        .run(&[1, 2, 3])
        .await
        .unwrap();

    assert_eq!(result.requested, 3);
    assert_eq!(result.processed, 2);
    assert_eq!(result.errors, 1);
    assert_eq!(result.total_relationships, 2);
    assert!(matches!(result.per_partition[&partition(2)], PartitionOutcome::Failed(_)));
    assert_eq!(result.per_partition[&partition(1)].relationships(), 1);
    assert_eq!(result.per_partition[&partition(3)].relationships(), 1);

    let kinds: Vec<RelationshipType> = store
        .inner
        .all_relationships()
        .unwrap()
        .iter()
        .map(|r| r.kind.relationship_type())
        .collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&RelationshipType::Redundant));
    assert!(kinds.contains(&RelationshipType::Conflicting));
}

#[tokio::test]
async fn test_failed_write_is_counted_and_partition_continues() {
    let inner = SqliteStore::in_memory().unwrap();
    seed(&inner);
    let p4 = partition(4);
    for (part, content) in [
        ("400", "Labels must list every ingredient."),
        ("401", "Labels must list every ingredient."),
        ("402", "Inspections occur twice a year."),
        ("403", "Inspections occur twice a year."),
    ] {
        inner
            .upsert_document_at(&DocumentKey::new(p4, part), "Title", content, "Agency", 1)
            .unwrap();
    }
    let rejected = inner.get_document(&DocumentKey::new(p4, "403")).unwrap().unwrap().id;
    let store = Arc::new(FlakyStore { rejected: Some(rejected), ..FlakyStore::new(inner) });

    let result = orchestrator(store.clone(), SweepConfig::default())
        .run(&[1, 2, 3, 4])
        .await
        .unwrap();

    assert_eq!(
        result.per_partition[&p4],
        PartitionOutcome::Completed { created: 1, skipped_existing: 0, persist_errors: 1 }
    );
    assert_eq!(result.processed, 4);
    assert_eq!(result.total_relationships, 4);
    assert_eq!(result.errors, 1);
    assert_eq!(result.failed().count(), 0);

    let stored = store.inner.all_relationships().unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|r| !r.involves(rejected)));
}

#[tokio::test]
async fn test_second_run_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::new(dir.path().join("bulk.db")).unwrap());
    seed(&store);
    let orchestrator = orchestrator(store.clone(), SweepConfig::default());

    let first = orchestrator.run(&[1, 2, 3]).await.unwrap();
    assert_eq!(first.total_relationships, 3);
    assert_eq!(first.errors, 0);
    let after_first: Vec<_> = store.all_relationships().unwrap().iter().map(|r| r.id).collect();

    let second = orchestrator.run(&[1, 2, 3]).await.unwrap();
    assert_eq!(second.total_relationships, 0);
    assert_eq!(second.errors, 0);
    assert_eq!(second.processed, 3);
    let after_second: Vec<_> = store.all_relationships().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_invalid_partition_rejects_whole_request() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    seed(&store);

    let err = orchestrator(store.clone(), SweepConfig::default())
        .run(&[1, 51])
        .await
        .unwrap_err();
    assert!(matches!(err, SweepError::Input(_)));
    assert_eq!(store.relationship_count().unwrap(), 0);
}

#[tokio::test]
async fn test_dry_run_persists_nothing() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    seed(&store);
    let config = SweepConfig { dry_run: true, ..Default::default() };

    let result = orchestrator(store.clone(), config).run(&[1, 2, 3]).await.unwrap();
    assert!(result.dry_run);
    assert_eq!(result.total_relationships, 3);
    assert_eq!(store.relationship_count().unwrap(), 0);
}

#[tokio::test]
async fn test_cancelled_run_starts_nothing() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    seed(&store);
    let orchestrator = orchestrator(store.clone(), SweepConfig::default());
    orchestrator.cancel_handle().cancel();

    let result = orchestrator.run(&[1, 2, 3]).await.unwrap();
    assert_eq!(result.requested, 3);
    assert_eq!(result.processed, 0);
    assert_eq!(result.errors, 0);
    assert_eq!(result.cancelled(), 3);
    assert_eq!(store.relationship_count().unwrap(), 0);
}

#[tokio::test]
async fn test_concurrency_does_not_change_results() {
    let serial_store = Arc::new(SqliteStore::in_memory().unwrap());
    seed(&serial_store);
    let parallel_store = Arc::new(SqliteStore::in_memory().unwrap());
    seed(&parallel_store);

    let serial = orchestrator(
        serial_store,
        SweepConfig { max_concurrent_partitions: 1, ..Default::default() },
    )
    .run_all()
    .await;
    let parallel = orchestrator(
        parallel_store,
        SweepConfig { max_concurrent_partitions: 8, ..Default::default() },
    )
    .run_all()
    .await;

    assert_eq!(serial.requested, 50);
    assert_eq!(serial.processed, 50);
    assert_eq!(serial.total_relationships, parallel.total_relationships);
    assert_eq!(serial.per_partition, parallel.per_partition);
}
