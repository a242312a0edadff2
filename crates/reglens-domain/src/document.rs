//! Document module - regulatory text documents keyed by partition and part

use std::fmt;

/// Identifier assigned to a document by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Create a DocumentId from a raw store value
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a partition identifier falls outside the fixed range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPartition(pub i64);

impl fmt::Display for InvalidPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid partition {}: expected a value in {}..={}",
            self.0,
            PartitionId::MIN,
            PartitionId::MAX
        )
    }
}

impl std::error::Error for InvalidPartition {}

/// A partition of the corpus (a CFR title in the source domain)
///
/// Pairwise detection is always scoped to one partition. Values are
/// restricted to the fixed range `1..=50`.
///
/// # Examples
///
/// ```
/// use reglens_domain::PartitionId;
///
/// let title = PartitionId::new(40).unwrap();
/// assert_eq!(title.value(), 40);
/// assert!(PartitionId::new(0).is_err());
/// assert_eq!(PartitionId::all().count(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionId(u32);

impl PartitionId {
    /// Lowest valid partition
    pub const MIN: u32 = 1;

    /// Highest valid partition
    pub const MAX: u32 = 50;

    /// Create a validated partition identifier
    pub fn new(value: i64) -> Result<Self, InvalidPartition> {
        if value < Self::MIN as i64 || value > Self::MAX as i64 {
            return Err(InvalidPartition(value));
        }
        Ok(Self(value as u32))
    }

    /// Get the raw partition number
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Iterate over the full fixed partition range
    pub fn all() -> impl Iterator<Item = PartitionId> {
        (Self::MIN..=Self::MAX).map(PartitionId)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PartitionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("Malformed partition identifier: '{}'", s))?;
        Self::new(value).map_err(|e| e.to_string())
    }
}

/// Natural key of a document: partition plus part number
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentKey {
    /// Partition the document belongs to
    pub partition: PartitionId,

    /// Part number within the partition (e.g. "1910")
    pub part_number: String,
}

impl DocumentKey {
    /// Create a new document key
    pub fn new(partition: PartitionId, part_number: impl Into<String>) -> Self {
        Self {
            partition,
            part_number: part_number.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.partition, self.part_number)
    }
}

impl std::str::FromStr for DocumentKey {
    type Err = String;

    /// Parse `partition:part` (e.g. `29:1910`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (partition, part) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid document key '{}': expected partition:part", s))?;
        if part.trim().is_empty() {
            return Err(format!("Invalid document key '{}': empty part number", s));
        }
        Ok(Self::new(partition.parse()?, part.trim()))
    }
}

/// A stored regulatory document
///
/// Read-only to the engines. `content_fingerprint` and `word_count` are
/// always derived from `content` by whoever writes the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier
    pub id: DocumentId,

    /// Natural key
    pub key: DocumentKey,

    /// Human readable title
    pub title: String,

    /// Full text, possibly empty
    pub content: String,

    /// Issuing agency
    pub agency_name: String,

    /// Lowercase hex SHA-256 of `content`
    pub content_fingerprint: String,

    /// Number of whitespace-delimited words in `content`
    pub word_count: u64,

    /// Creation time (Unix seconds)
    pub created_at: u64,

    /// Last update time (Unix seconds)
    pub updated_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_bounds() {
        assert!(PartitionId::new(1).is_ok());
        assert!(PartitionId::new(50).is_ok());
        assert_eq!(PartitionId::new(0), Err(InvalidPartition(0)));
        assert_eq!(PartitionId::new(51), Err(InvalidPartition(51)));
        assert!(PartitionId::new(-3).is_err());
    }

    #[test]
    fn test_partition_range_is_ordered() {
        let all: Vec<u32> = PartitionId::all().map(|p| p.value()).collect();
        assert_eq!(all.first(), Some(&1));
        assert_eq!(all.last(), Some(&50));
        assert_eq!(all.len(), 50);
    }

    #[test]
    fn test_partition_from_str() {
        assert_eq!("7".parse::<PartitionId>().unwrap().value(), 7);
        assert!("seven".parse::<PartitionId>().is_err());
        assert!("99".parse::<PartitionId>().is_err());
    }

    #[test]
    fn test_document_key_parse_and_display() {
        let key: DocumentKey = "29:1910".parse().unwrap();
        assert_eq!(key.partition.value(), 29);
        assert_eq!(key.part_number, "1910");
        assert_eq!(key.to_string(), "29:1910");

        assert!("29".parse::<DocumentKey>().is_err());
        assert!("29:".parse::<DocumentKey>().is_err());
        assert!("0:12".parse::<DocumentKey>().is_err());
    }
}
