//! The durable canonical-key → alias table.

use crate::errors::VeilResult;
use crate::types::{CanonicalKey, EntityType, EntryBatch, FindOrCreate};

/// Read-only view of assigned aliases, valid inside one `find_or_create`
/// critical section. Alias generators use it to stay distinct from every
/// alias already assigned for the type.
pub trait AliasLedger {
    /// Number of entries of this type, including the caller's own writes.
    fn assigned_count(&self, entity_type: EntityType) -> VeilResult<u64>;

    fn is_alias_taken(&self, entity_type: EntityType, alias: &str) -> VeilResult<bool>;
}

/// Mapping store: exactly one entry per canonical key, aliases unique per
/// entity type, entries never updated or deleted.
///
/// Injected into the engine; there is no process-wide instance.
pub trait MappingStore: Send + Sync {
    /// Alias for `key` if an entry exists. Never allocates one.
    fn lookup(&self, key: &CanonicalKey) -> VeilResult<Option<String>>;

    /// Atomic test-and-set. When no entry exists for `key`, `assign` is
    /// called inside the critical section and its alias is persisted; when
    /// one exists (including one created concurrently by another caller),
    /// `assign` is not called and the existing alias is returned.
    ///
    /// `assign` is called at most once per call. Transient contention before
    /// it runs is retried with backoff; a failure after it is
    /// `StorageError::WriteConflict`, as is running out of retries. Never a
    /// fresh entry.
    fn find_or_create(
        &self,
        key: &CanonicalKey,
        assign: &mut dyn FnMut(&dyn AliasLedger) -> VeilResult<String>,
    ) -> VeilResult<FindOrCreate>;

    /// Entries with a sequence number greater than `after_seq`, in order.
    /// Undecryptable rows are listed in `corrupted` instead of failing.
    fn entries_since(&self, after_seq: u64) -> VeilResult<EntryBatch>;

    /// Total number of entries.
    fn count(&self) -> VeilResult<u64>;

    /// Entry counts per entity type, every type listed.
    fn count_by_type(&self) -> VeilResult<Vec<(EntityType, u64)>>;
}
