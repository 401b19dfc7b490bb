//! Queries for the mapping_entries table: append-only, sealed columns.

use rusqlite::{params, Connection, OptionalExtension};
use veil_core::errors::StorageError;
use veil_core::types::EntityType;

use crate::connection::map_sqlite_error;

/// A mapping_entries row as stored.
#[derive(Debug, Clone)]
pub struct MappingEntryRow {
    pub seq: i64,
    pub key_ciphertext: Vec<u8>,
    pub entity_type: String,
    pub alias_ciphertext: Vec<u8>,
    /// Unix milliseconds.
    pub created_at: i64,
}

/// `(seq, alias_ciphertext)` for a sealed key.
pub fn find_by_key(
    conn: &Connection,
    key_ciphertext: &[u8],
) -> Result<Option<(i64, Vec<u8>)>, StorageError> {
    conn.prepare_cached(
        "SELECT seq, alias_ciphertext FROM mapping_entries WHERE key_ciphertext = ?1",
    )
    .map_err(map_sqlite_error)?
    .query_row(params![key_ciphertext], |row| Ok((row.get(0)?, row.get(1)?)))
    .optional()
    .map_err(map_sqlite_error)
}

pub fn alias_exists(
    conn: &Connection,
    entity_type: EntityType,
    alias_ciphertext: &[u8],
) -> Result<bool, StorageError> {
    conn.prepare_cached(
        "SELECT EXISTS(SELECT 1 FROM mapping_entries
                       WHERE entity_type = ?1 AND alias_ciphertext = ?2)",
    )
    .map_err(map_sqlite_error)?
    .query_row(params![entity_type.as_str(), alias_ciphertext], |row| row.get(0))
    .map_err(map_sqlite_error)
}

/// Insert a new entry. Returns its sequence number.
pub fn insert(
    conn: &Connection,
    key_ciphertext: &[u8],
    entity_type: EntityType,
    alias_ciphertext: &[u8],
    created_at: i64,
) -> Result<i64, StorageError> {
    conn.prepare_cached(
        "INSERT INTO mapping_entries (key_ciphertext, entity_type, alias_ciphertext, created_at)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .map_err(map_sqlite_error)?
    .execute(params![
        key_ciphertext,
        entity_type.as_str(),
        alias_ciphertext,
        created_at
    ])
    .map_err(map_sqlite_error)?;
    Ok(conn.last_insert_rowid())
}

pub fn count_all(conn: &Connection) -> Result<u64, StorageError> {
    let n: i64 = conn
        .prepare_cached("SELECT COUNT(*) FROM mapping_entries")
        .map_err(map_sqlite_error)?
        .query_row([], |row| row.get(0))
        .map_err(map_sqlite_error)?;
    Ok(n as u64)
}

pub fn count_by_type(conn: &Connection, entity_type: EntityType) -> Result<u64, StorageError> {
    let n: i64 = conn
        .prepare_cached("SELECT COUNT(*) FROM mapping_entries WHERE entity_type = ?1")
        .map_err(map_sqlite_error)?
        .query_row(params![entity_type.as_str()], |row| row.get(0))
        .map_err(map_sqlite_error)?;
    Ok(n as u64)
}

/// Rows with `seq > after_seq`, ascending.
pub fn select_since(conn: &Connection, after_seq: i64) -> Result<Vec<MappingEntryRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT seq, key_ciphertext, entity_type, alias_ciphertext, created_at
             FROM mapping_entries WHERE seq > ?1 ORDER BY seq ASC",
        )
        .map_err(map_sqlite_error)?;

    let rows = stmt
        .query_map(params![after_seq], |row| {
            Ok(MappingEntryRow {
                seq: row.get(0)?,
                key_ciphertext: row.get(1)?,
                entity_type: row.get(2)?,
                alias_ciphertext: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .map_err(map_sqlite_error)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(map_sqlite_error)
}
