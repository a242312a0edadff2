//! SQLite-backed document and relationship store

use crate::{unix_now, StoreError};
use reglens_analysis::{fingerprint, word_count};
use reglens_domain::traits::{DocumentStore, RelationshipStore};
use reglens_domain::{
    ConflictSeverity, DetectionMethod, Document, DocumentId, DocumentKey, PairKey, PartitionId,
    Relationship, RelationshipCandidate, RelationshipId, RelationshipKind, RelationshipType,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const DOCUMENT_COLUMNS: &str = "id, partition, part_number, title, content, agency_name, \
     content_fingerprint, word_count, created_at, updated_at";

const RELATIONSHIP_COLUMNS: &str = "id, source_id, target_id, relationship_type, conflict_severity, \
     similarity_score, overlap_details, detected_by, is_confirmed, review_notes, detected_at, \
     updated_at, version";

/// SQLite implementation of the document and relationship stores
///
/// The connection sits behind a mutex, so a single store is `Send + Sync`
/// and can be shared by partition workers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use reglens_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("reglens.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a fresh in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Insert or replace the document at `key`, stamped with the current time
    pub fn upsert_document(
        &self,
        key: &DocumentKey,
        title: &str,
        content: &str,
        agency_name: &str,
    ) -> Result<Document, StoreError> {
        self.upsert_document_at(key, title, content, agency_name, unix_now())
    }

    /// Insert or replace the document at `key` with an explicit timestamp
    ///
    /// Fingerprint and word count are always recomputed from `content`.
    /// An existing row keeps its id and `created_at`.
    pub fn upsert_document_at(
        &self,
        key: &DocumentKey,
        title: &str,
        content: &str,
        agency_name: &str,
        now: u64,
    ) -> Result<Document, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO documents (partition, part_number, title, content, agency_name,
                                    content_fingerprint, word_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(partition, part_number) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                agency_name = excluded.agency_name,
                content_fingerprint = excluded.content_fingerprint,
                word_count = excluded.word_count,
                updated_at = excluded.updated_at",
            params![
                key.partition.value(),
                &key.part_number,
                title,
                content,
                agency_name,
                fingerprint(content),
                word_count(content) as i64,
                now as i64,
            ],
        )?;

        query_document(&conn, key)?.ok_or_else(|| {
            StoreError::InvalidData(format!("Document {} missing after upsert", key))
        })
    }

    /// Number of stored documents
    pub fn document_count(&self) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Partitions holding at least one document, ascending
    pub fn populated_partitions(&self) -> Result<Vec<PartitionId>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT partition FROM documents ORDER BY partition")?;
        let partitions = stmt
            .query_map([], |row| {
                let value: i64 = row.get(0)?;
                PartitionId::new(value).map_err(|e| conversion_error(0, e))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(partitions)
    }

    /// Number of stored relationships
    pub fn relationship_count(&self) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM relationships", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Natural key of the document with `id`
    pub fn document_key(&self, id: DocumentId) -> Result<Option<DocumentKey>, StoreError> {
        let conn = self.conn()?;
        let key = conn
            .query_row(
                "SELECT partition, part_number FROM documents WHERE id = ?1",
                params![id.value() as i64],
                |row| {
                    let partition: i64 = row.get(0)?;
                    let partition = PartitionId::new(partition).map_err(|e| conversion_error(0, e))?;
                    Ok(DocumentKey::new(partition, row.get::<_, String>(1)?))
                },
            )
            .optional()?;
        Ok(key)
    }

    fn query_documents(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Document>, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM documents {}", DOCUMENT_COLUMNS, filter);
        let mut stmt = conn.prepare(&sql)?;
        let documents = stmt
            .query_map(params, row_to_document)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }

    fn query_relationships(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Relationship>, StoreError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM relationships {}", RELATIONSHIP_COLUMNS, filter);
        let mut stmt = conn.prepare(&sql)?;
        let relationships = stmt
            .query_map(params, row_to_relationship)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(relationships)
    }
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}

fn invalid(column: usize, message: String) -> rusqlite::Error {
    conversion_error(column, StoreError::InvalidData(message))
}

fn query_document(conn: &Connection, key: &DocumentKey) -> Result<Option<Document>, StoreError> {
    let sql = format!(
        "SELECT {} FROM documents WHERE partition = ?1 AND part_number = ?2",
        DOCUMENT_COLUMNS
    );
    let document = conn
        .query_row(&sql, params![key.partition.value(), &key.part_number], row_to_document)
        .optional()?;
    Ok(document)
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let partition: i64 = row.get(1)?;
    let partition = PartitionId::new(partition).map_err(|e| conversion_error(1, e))?;

    Ok(Document {
        id: DocumentId::from_value(row.get::<_, i64>(0)? as u64),
        key: DocumentKey::new(partition, row.get::<_, String>(2)?),
        title: row.get(3)?,
        content: row.get(4)?,
        agency_name: row.get(5)?,
        content_fingerprint: row.get(6)?,
        word_count: row.get::<_, i64>(7)? as u64,
        created_at: row.get::<_, i64>(8)? as u64,
        updated_at: row.get::<_, i64>(9)? as u64,
    })
}

fn relationship_id_to_bytes(id: RelationshipId) -> Vec<u8> {
    id.value().to_be_bytes().to_vec()
}

fn bytes_to_relationship_id(bytes: &[u8]) -> Result<RelationshipId, StoreError> {
    let arr: [u8; 16] = bytes.try_into().map_err(|_| {
        StoreError::InvalidData(format!(
            "Expected 16 bytes for RelationshipId, got {}",
            bytes.len()
        ))
    })?;
    Ok(RelationshipId::from_value(u128::from_be_bytes(arr)))
}

fn row_to_relationship(row: &Row<'_>) -> rusqlite::Result<Relationship> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = bytes_to_relationship_id(&id_bytes).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
    })?;

    let type_code: String = row.get(3)?;
    let relationship_type = RelationshipType::parse(&type_code)
        .ok_or_else(|| invalid(3, format!("Unknown relationship type: {}", type_code)))?;

    let severity_code: Option<String> = row.get(4)?;
    let severity = match severity_code {
        Some(code) => Some(
            ConflictSeverity::parse(&code)
                .ok_or_else(|| invalid(4, format!("Unknown conflict severity: {}", code)))?,
        ),
        None => None,
    };
    let kind = RelationshipKind::from_parts(relationship_type, severity).map_err(|e| invalid(4, e))?;

    let detected_by: String = row.get(7)?;

    Ok(Relationship {
        id,
        source: DocumentId::from_value(row.get::<_, i64>(1)? as u64),
        target: DocumentId::from_value(row.get::<_, i64>(2)? as u64),
        kind,
        similarity_score: row.get(5)?,
        overlap_details: row.get(6)?,
        detected_by: DetectionMethod::parse(&detected_by),
        is_confirmed: row.get(8)?,
        review_notes: row.get(9)?,
        detected_at: row.get::<_, i64>(10)? as u64,
        updated_at: row.get::<_, i64>(11)? as u64,
        version: row.get::<_, i64>(12)? as u64,
    })
}

impl DocumentStore for SqliteStore {
    type Error = StoreError;

    fn get_document(&self, key: &DocumentKey) -> Result<Option<Document>, Self::Error> {
        let conn = self.conn()?;
        query_document(&conn, key)
    }

    fn documents_in_partition(&self, partition: PartitionId) -> Result<Vec<Document>, Self::Error> {
        self.query_documents("WHERE partition = ?1 ORDER BY id", &[&partition.value()])
    }

    fn all_documents(&self) -> Result<Vec<Document>, Self::Error> {
        self.query_documents("ORDER BY partition, id", &[])
    }

    fn documents_updated_since(&self, since: u64) -> Result<Vec<Document>, Self::Error> {
        self.query_documents(
            "WHERE updated_at >= ?1 ORDER BY updated_at DESC, id",
            &[&(since as i64)],
        )
    }
}

impl RelationshipStore for SqliteStore {
    type Error = StoreError;

    fn find_relationship(
        &self,
        a: DocumentId,
        b: DocumentId,
    ) -> Result<Option<Relationship>, Self::Error> {
        let pair = PairKey::new(a, b);
        let mut found = self.query_relationships(
            "WHERE pair_low = ?1 AND pair_high = ?2",
            &[&(pair.low().value() as i64), &(pair.high().value() as i64)],
        )?;
        Ok(found.pop())
    }

    fn create_relationship(
        &self,
        candidate: RelationshipCandidate,
        detected_at: u64,
    ) -> Result<Relationship, Self::Error> {
        let relationship = Relationship::from_candidate(RelationshipId::new(), candidate, detected_at);
        let pair = relationship.pair_key();

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO relationships (id, source_id, target_id, pair_low, pair_high,
                                        relationship_type, conflict_severity, similarity_score,
                                        overlap_details, detected_by, is_confirmed, review_notes,
                                        detected_at, updated_at, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                relationship_id_to_bytes(relationship.id),
                relationship.source.value() as i64,
                relationship.target.value() as i64,
                pair.low().value() as i64,
                pair.high().value() as i64,
                relationship.kind.relationship_type().as_str(),
                relationship.kind.conflict_severity().map(|s| s.as_str()),
                relationship.similarity_score,
                &relationship.overlap_details,
                relationship.detected_by.as_str(),
                relationship.is_confirmed,
                &relationship.review_notes,
                relationship.detected_at as i64,
                relationship.updated_at as i64,
                relationship.version as i64,
            ],
        );

        match inserted {
            Ok(_) => Ok(relationship),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::DuplicatePair(format!(
                    "({}, {})",
                    pair.low(),
                    pair.high()
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn relationships_for_document(&self, id: DocumentId) -> Result<Vec<Relationship>, Self::Error> {
        self.query_relationships(
            "WHERE source_id = ?1 OR target_id = ?1 ORDER BY detected_at, pair_low, pair_high",
            &[&(id.value() as i64)],
        )
    }

    fn all_relationships(&self) -> Result<Vec<Relationship>, Self::Error> {
        self.query_relationships("ORDER BY detected_at, pair_low, pair_high", &[])
    }
}
