//! Reglens Storage Layer
//!
//! Implements the `DocumentStore` and `RelationshipStore` traits on SQLite.
//!
//! # Architecture
//!
//! - One SQLite database holding documents and relationships
//! - A single connection behind a mutex, so one store can be shared by
//!   partition workers through an `Arc`
//! - Undirected relationship uniqueness enforced by a unique index on
//!   the ordered pair `(pair_low, pair_high)`
//! - [`RelationshipWriter`] in front of any relationship store to drop
//!   candidates whose pair is already linked
//!
//! # Examples
//!
//! ```no_run
//! use reglens_domain::{DocumentKey, PartitionId};
//! use reglens_store::SqliteStore;
//!
//! let store = SqliteStore::new("reglens.db")?;
//! let key = DocumentKey::new(PartitionId::new(29)?, "1910");
//! store.upsert_document(&key, "Occupational Safety", "Employers shall ...", "OSHA")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod sqlite;
mod writer;

pub use sqlite::SqliteStore;
pub use writer::{PersistOutcome, RelationshipWriter};

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A relationship already links this pair
    #[error("Relationship already exists for pair {0}")]
    DuplicatePair(String),

    /// Stored row could not be mapped back into the domain
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Connection mutex was poisoned by a panicking holder
    #[error("Store connection lock poisoned")]
    LockPoisoned,
}

/// Result alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Current time in Unix seconds
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
