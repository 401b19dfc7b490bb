//! Persistent mapping entries and the results of store operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CanonicalKey;

/// One row of the mapping table, decrypted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Monotonic insertion sequence assigned by the store.
    pub seq: u64,
    pub key: CanonicalKey,
    pub alias: String,
    pub created_at: DateTime<Utc>,
}

/// A stored row that could not be decrypted or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorruptedEntry {
    pub seq: u64,
    pub details: String,
}

/// Entries inserted after some sequence number, for incremental sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryBatch {
    pub entries: Vec<MappingEntry>,
    pub corrupted: Vec<CorruptedEntry>,
    /// Highest sequence number covered by this batch (readable or not).
    pub high_water: u64,
}

/// Outcome of `find_or_create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOrCreate {
    pub alias: String,
    /// True when this call inserted the entry.
    pub created: bool,
}
