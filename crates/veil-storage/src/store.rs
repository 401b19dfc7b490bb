//! SQLite mapping store.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rusqlite::Connection;

use veil_core::config::StorageConfig;
use veil_core::constants::KEY_CHECK_PLAINTEXT;
use veil_core::errors::{AliasError, StorageError, VeilError, VeilResult};
use veil_core::traits::{AliasLedger, DeterministicCipher, MappingStore};
use veil_core::types::{
    CanonicalKey, CorruptedEntry, EntityType, EntryBatch, FindOrCreate, MappingEntry,
};

use crate::connection::writer::with_immediate_transaction;
use crate::connection::DatabaseManager;
use crate::queries::mapping_entries::{self, MappingEntryRow};
use crate::queries::store_meta;
use crate::retry::RetryPolicy;

/// Mapping store backed by one SQLite file.
///
/// Several instances (threads or processes) may open the same file; the
/// `BEGIN IMMEDIATE` test-and-set in [`MappingStore::find_or_create`] keeps
/// one entry per key across all of them.
pub struct SqliteMappingStore {
    db: DatabaseManager,
    cipher: Arc<dyn DeterministicCipher>,
    /// Sealed key → alias. Entries never change once written, so a cached
    /// alias can never go stale.
    cache: DashMap<Vec<u8>, String>,
    retry: RetryPolicy,
}

impl SqliteMappingStore {
    /// Open (or create) the store at `path`.
    ///
    /// Fails with `StorageError::KeyMismatch` if the file was created under a
    /// different cipher key.
    pub fn open(
        path: &Path,
        cipher: Arc<dyn DeterministicCipher>,
        config: &StorageConfig,
    ) -> VeilResult<Self> {
        let db = DatabaseManager::open(path, config)?;
        let store = Self {
            db,
            cipher,
            cache: DashMap::new(),
            retry: RetryPolicy::from_config(config),
        };
        store.verify_key()?;
        tracing::debug!(path = %path.display(), "opened mapping store");
        Ok(store)
    }

    /// Open the store at the configured `storage.db_path`.
    pub fn open_from_config(
        config: &StorageConfig,
        cipher: Arc<dyn DeterministicCipher>,
    ) -> VeilResult<Self> {
        let path = config.effective_db_path();
        Self::open(Path::new(&path), cipher, config)
    }

    /// Private in-memory store. Nothing survives the instance.
    pub fn open_in_memory(cipher: Arc<dyn DeterministicCipher>) -> VeilResult<Self> {
        let store = Self {
            db: DatabaseManager::open_in_memory()?,
            cipher,
            cache: DashMap::new(),
            retry: RetryPolicy::default(),
        };
        store.verify_key()?;
        Ok(store)
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.db.path()
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    /// Seal the check value on first open; compare on every later open.
    fn verify_key(&self) -> VeilResult<()> {
        let expected = self.cipher.seal(KEY_CHECK_PLAINTEXT)?;
        self.retry.run("verify_key", |_| {
            self.db.with_writer(|conn| {
                with_immediate_transaction(conn, |tx| -> VeilResult<()> {
                    match store_meta::get(tx, store_meta::KEY_CHECK)? {
                        Some(stored) if stored == expected => Ok(()),
                        Some(_) => Err(VeilError::Storage(StorageError::KeyMismatch)),
                        None => {
                            store_meta::put(tx, store_meta::KEY_CHECK, &expected)?;
                            Ok(())
                        }
                    }
                })
            })
        })
    }

    fn seal_key(&self, key: &CanonicalKey) -> VeilResult<Vec<u8>> {
        Ok(self.cipher.seal(&key.to_storage_bytes())?)
    }

    fn open_alias(&self, seq: i64, alias_ciphertext: &[u8]) -> Result<String, StorageError> {
        let bytes = self
            .cipher
            .open(alias_ciphertext)
            .map_err(|e| StorageError::Corruption {
                seq: seq as u64,
                details: format!("alias: {e}"),
            })?;
        String::from_utf8(bytes).map_err(|_| StorageError::Corruption {
            seq: seq as u64,
            details: "alias is not valid UTF-8".to_string(),
        })
    }

    fn decode_row(&self, row: &MappingEntryRow) -> Result<MappingEntry, StorageError> {
        let seq = row.seq as u64;
        let key_bytes = self
            .cipher
            .open(&row.key_ciphertext)
            .map_err(|e| StorageError::Corruption {
                seq,
                details: format!("key: {e}"),
            })?;
        let key = CanonicalKey::from_storage_bytes(&key_bytes).ok_or_else(|| {
            StorageError::Corruption {
                seq,
                details: "key does not decode to a canonical key".to_string(),
            }
        })?;
        if key.entity_type.as_str() != row.entity_type {
            return Err(StorageError::Corruption {
                seq,
                details: format!(
                    "entity_type column {} disagrees with sealed key",
                    row.entity_type
                ),
            });
        }
        let alias = self.open_alias(row.seq, &row.alias_ciphertext)?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(row.created_at).ok_or_else(|| {
            StorageError::Corruption {
                seq,
                details: format!("created_at {} out of range", row.created_at),
            }
        })?;
        Ok(MappingEntry {
            seq,
            key,
            alias,
            created_at,
        })
    }

    fn lookup_sealed(&self, sealed_key: &[u8]) -> VeilResult<Option<String>> {
        if let Some(alias) = self.cache.get(sealed_key) {
            return Ok(Some(alias.clone()));
        }
        let found = self
            .db
            .with_reader(|conn| mapping_entries::find_by_key(conn, sealed_key))?;
        match found {
            Some((seq, alias_ct)) => {
                let alias = self.open_alias(seq, &alias_ct)?;
                self.cache.insert(sealed_key.to_vec(), alias.clone());
                Ok(Some(alias))
            }
            None => Ok(None),
        }
    }
}

/// Alias view over the open write transaction.
struct TxLedger<'a> {
    conn: &'a Connection,
    cipher: &'a dyn DeterministicCipher,
}

impl AliasLedger for TxLedger<'_> {
    fn assigned_count(&self, entity_type: EntityType) -> VeilResult<u64> {
        Ok(mapping_entries::count_by_type(self.conn, entity_type)?)
    }

    fn is_alias_taken(&self, entity_type: EntityType, alias: &str) -> VeilResult<bool> {
        let sealed = self.cipher.seal(alias.as_bytes())?;
        Ok(mapping_entries::alias_exists(self.conn, entity_type, &sealed)?)
    }
}

impl MappingStore for SqliteMappingStore {
    fn lookup(&self, key: &CanonicalKey) -> VeilResult<Option<String>> {
        let sealed_key = self.seal_key(key)?;
        self.lookup_sealed(&sealed_key)
    }

    fn find_or_create(
        &self,
        key: &CanonicalKey,
        assign: &mut dyn FnMut(&dyn AliasLedger) -> VeilResult<String>,
    ) -> VeilResult<FindOrCreate> {
        let _span = veil_core::find_or_create_span!(key.entity_type).entered();
        let sealed_key = self.seal_key(key)?;

        if let Some(alias) = self.lookup_sealed(&sealed_key)? {
            return Ok(FindOrCreate {
                alias,
                created: false,
            });
        }

        let entity_type = key.entity_type;
        // `assign` runs at most once: a failure after it is not retried.
        let outcome = self.retry.run_unrepeatable("find_or_create", |_, assigned| {
            self.db.with_writer(|conn| {
                with_immediate_transaction(conn, |tx| -> VeilResult<FindOrCreate> {
                    // Re-check under the write lock: another writer may have
                    // inserted since the read above.
                    if let Some((seq, alias_ct)) = mapping_entries::find_by_key(tx, &sealed_key)? {
                        let alias = self.open_alias(seq, &alias_ct)?;
                        return Ok(FindOrCreate {
                            alias,
                            created: false,
                        });
                    }

                    let ledger = TxLedger {
                        conn: tx,
                        cipher: self.cipher.as_ref(),
                    };
                    *assigned = true;
                    let alias = assign(&ledger)?;
                    if alias.trim().is_empty() {
                        return Err(AliasError::EmptyAlias { entity_type }.into());
                    }

                    let alias_ct = self.cipher.seal(alias.as_bytes())?;
                    if mapping_entries::alias_exists(tx, entity_type, &alias_ct)? {
                        return Err(AliasError::AliasTaken { entity_type, alias }.into());
                    }

                    let seq = mapping_entries::insert(
                        tx,
                        &sealed_key,
                        entity_type,
                        &alias_ct,
                        Utc::now().timestamp_millis(),
                    )?;
                    tracing::info!(entity_type = %entity_type, seq, "created mapping entry");
                    Ok(FindOrCreate {
                        alias,
                        created: true,
                    })
                })
            })
        })?;

        self.cache.insert(sealed_key, outcome.alias.clone());
        Ok(outcome)
    }

    fn entries_since(&self, after_seq: u64) -> VeilResult<EntryBatch> {
        let after = i64::try_from(after_seq).unwrap_or(i64::MAX);
        let rows = self
            .db
            .with_reader(|conn| mapping_entries::select_since(conn, after))?;

        let mut batch = EntryBatch {
            high_water: after_seq,
            ..Default::default()
        };
        for row in &rows {
            batch.high_water = batch.high_water.max(row.seq as u64);
            match self.decode_row(row) {
                Ok(entry) => {
                    self.cache
                        .entry(row.key_ciphertext.clone())
                        .or_insert_with(|| entry.alias.clone());
                    batch.entries.push(entry);
                }
                Err(StorageError::Corruption { seq, details }) => {
                    tracing::warn!(seq, %details, "skipping corrupted mapping entry");
                    batch.corrupted.push(CorruptedEntry { seq, details });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(batch)
    }

    fn count(&self) -> VeilResult<u64> {
        Ok(self.db.with_reader(mapping_entries::count_all)?)
    }

    fn count_by_type(&self) -> VeilResult<Vec<(EntityType, u64)>> {
        let counts = self.db.with_reader(|conn| {
            EntityType::ALL
                .iter()
                .map(|t| Ok((*t, mapping_entries::count_by_type(conn, *t)?)))
                .collect::<Result<Vec<(EntityType, u64)>, StorageError>>()
        })?;
        Ok(counts)
    }
}
