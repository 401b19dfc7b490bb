//! Index of canonical entities an occurrence can resolve against.

use std::collections::{BTreeSet, HashMap, HashSet};

use veil_core::errors::VeilResult;
use veil_core::traits::MappingStore;
use veil_core::types::{CanonicalEntity, CanonicalKey, EntityType};

/// What the resolver needs from a set of known entities.
pub trait EntityIndex {
    fn contains(&self, key: &CanonicalKey) -> bool;

    /// Keys of `entity_type` whose token set strictly contains `tokens`.
    fn supersets_of(&self, entity_type: EntityType, tokens: &[String]) -> BTreeSet<CanonicalKey>;
}

/// Canonical entities by key, with a token index for subset queries.
#[derive(Debug, Default, Clone)]
pub struct KnownEntities {
    entities: HashMap<CanonicalKey, CanonicalEntity>,
    by_token: HashMap<(EntityType, String), BTreeSet<CanonicalKey>>,
    /// Highest store sequence number folded in.
    high_water: u64,
}

/// Outcome of one incremental sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub added: usize,
    pub corrupted: usize,
}

impl KnownEntities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity. Returns false, leaving the index unchanged, when the
    /// key is already known.
    pub fn insert(&mut self, entity: CanonicalEntity) -> bool {
        if self.entities.contains_key(&entity.key) {
            return false;
        }
        for token in distinct_tokens(&entity.component_tokens) {
            self.by_token
                .entry((entity.entity_type(), token.to_string()))
                .or_default()
                .insert(entity.key.clone());
        }
        self.entities.insert(entity.key.clone(), entity);
        true
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<&CanonicalEntity> {
        self.entities.get(key)
    }

    pub fn get_mut(&mut self, key: &CanonicalKey) -> Option<&mut CanonicalEntity> {
        self.entities.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    /// Fold in every store entry written since the last sync.
    pub fn sync_from_store(&mut self, store: &dyn MappingStore) -> VeilResult<SyncStats> {
        let batch = store.entries_since(self.high_water)?;
        let mut stats = SyncStats {
            corrupted: batch.corrupted.len(),
            ..Default::default()
        };
        for entry in batch.entries {
            if self.insert(CanonicalEntity::from_store(entry.key)) {
                stats.added += 1;
            }
        }
        self.high_water = batch.high_water;
        if stats.added > 0 || stats.corrupted > 0 {
            tracing::debug!(
                added = stats.added,
                corrupted = stats.corrupted,
                high_water = self.high_water,
                "synced known entities from mapping store"
            );
        }
        Ok(stats)
    }
}

impl EntityIndex for KnownEntities {
    fn contains(&self, key: &CanonicalKey) -> bool {
        self.entities.contains_key(key)
    }

    fn supersets_of(&self, entity_type: EntityType, tokens: &[String]) -> BTreeSet<CanonicalKey> {
        let wanted: Vec<&str> = distinct_tokens(tokens);
        let mut postings: Vec<&BTreeSet<CanonicalKey>> = Vec::with_capacity(wanted.len());
        for token in &wanted {
            match self.by_token.get(&(entity_type, token.to_string())) {
                Some(keys) => postings.push(keys),
                None => return BTreeSet::new(),
            }
        }
        postings.sort_by_key(|keys| keys.len());
        let Some((smallest, rest)) = postings.split_first() else {
            return BTreeSet::new();
        };

        smallest
            .iter()
            .filter(|key| rest.iter().all(|keys| keys.contains(*key)))
            .filter(|key| {
                self.entities
                    .get(*key)
                    .is_some_and(|e| distinct_tokens(&e.component_tokens).len() > wanted.len())
            })
            .cloned()
            .collect()
    }
}

/// Store entities, entities first seen elsewhere in the current batch, and
/// the current document's entities, seen as one index.
pub struct Layered<'a> {
    pub store: &'a KnownEntities,
    pub batch: Option<&'a KnownEntities>,
    pub local: &'a KnownEntities,
}

impl EntityIndex for Layered<'_> {
    fn contains(&self, key: &CanonicalKey) -> bool {
        self.local.contains(key)
            || self.batch.is_some_and(|batch| batch.contains(key))
            || self.store.contains(key)
    }

    fn supersets_of(&self, entity_type: EntityType, tokens: &[String]) -> BTreeSet<CanonicalKey> {
        let mut keys = self.store.supersets_of(entity_type, tokens);
        if let Some(batch) = self.batch {
            keys.extend(batch.supersets_of(entity_type, tokens));
        }
        keys.extend(self.local.supersets_of(entity_type, tokens));
        keys
    }
}

/// Number of distinct tokens, the measure of how full a form is.
pub fn fullness(tokens: &[String]) -> usize {
    distinct_tokens(tokens).len()
}

fn distinct_tokens(tokens: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !t.is_empty() && seen.insert(*t))
        .collect()
}
