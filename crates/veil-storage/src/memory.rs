//! In-memory mapping store. Same contract as the SQLite store, nothing
//! persisted and nothing sealed; for tests and single-shot runs.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::Utc;

use veil_core::errors::{AliasError, StorageError, VeilResult};
use veil_core::traits::{AliasLedger, MappingStore};
use veil_core::types::{CanonicalKey, EntityType, EntryBatch, FindOrCreate, MappingEntry};

#[derive(Debug, Default)]
struct State {
    /// Index into `entries` by key.
    by_key: HashMap<CanonicalKey, usize>,
    aliases: HashMap<EntityType, HashSet<String>>,
    entries: Vec<MappingEntry>,
}

impl AliasLedger for State {
    fn assigned_count(&self, entity_type: EntityType) -> VeilResult<u64> {
        Ok(self.aliases.get(&entity_type).map_or(0, |s| s.len() as u64))
    }

    fn is_alias_taken(&self, entity_type: EntityType, alias: &str) -> VeilResult<bool> {
        Ok(self
            .aliases
            .get(&entity_type)
            .is_some_and(|s| s.contains(alias)))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    state: RwLock<State>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable {
            message: "in-memory store lock poisoned".to_string(),
        }
    }
}

impl MappingStore for InMemoryMappingStore {
    fn lookup(&self, key: &CanonicalKey) -> VeilResult<Option<String>> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state
            .by_key
            .get(key)
            .map(|&idx| state.entries[idx].alias.clone()))
    }

    fn find_or_create(
        &self,
        key: &CanonicalKey,
        assign: &mut dyn FnMut(&dyn AliasLedger) -> VeilResult<String>,
    ) -> VeilResult<FindOrCreate> {
        let mut state = self.state.write().map_err(|_| Self::poisoned())?;
        if let Some(&idx) = state.by_key.get(key) {
            return Ok(FindOrCreate {
                alias: state.entries[idx].alias.clone(),
                created: false,
            });
        }

        let entity_type = key.entity_type;
        let alias = assign(&*state)?;
        if alias.trim().is_empty() {
            return Err(AliasError::EmptyAlias { entity_type }.into());
        }
        if state.is_alias_taken(entity_type, &alias)? {
            return Err(AliasError::AliasTaken { entity_type, alias }.into());
        }

        let seq = state.entries.len() as u64 + 1;
        state.entries.push(MappingEntry {
            seq,
            key: key.clone(),
            alias: alias.clone(),
            created_at: Utc::now(),
        });
        let idx = state.entries.len() - 1;
        state.by_key.insert(key.clone(), idx);
        state
            .aliases
            .entry(entity_type)
            .or_default()
            .insert(alias.clone());
        tracing::debug!(entity_type = %entity_type, seq, "created in-memory mapping entry");

        Ok(FindOrCreate {
            alias,
            created: true,
        })
    }

    fn entries_since(&self, after_seq: u64) -> VeilResult<EntryBatch> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        let start = usize::try_from(after_seq)
            .unwrap_or(usize::MAX)
            .min(state.entries.len());
        let entries: Vec<MappingEntry> = state.entries[start..].to_vec();
        let high_water = entries.last().map_or(after_seq, |e| e.seq);
        Ok(EntryBatch {
            entries,
            corrupted: Vec::new(),
            high_water,
        })
    }

    fn count(&self) -> VeilResult<u64> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        Ok(state.entries.len() as u64)
    }

    fn count_by_type(&self) -> VeilResult<Vec<(EntityType, u64)>> {
        let state = self.state.read().map_err(|_| Self::poisoned())?;
        EntityType::ALL
            .iter()
            .map(|t| Ok((*t, state.assigned_count(*t)?)))
            .collect()
    }
}
