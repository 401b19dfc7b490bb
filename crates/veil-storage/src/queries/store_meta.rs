//! Queries for the store_meta key/value table.

use rusqlite::{params, Connection, OptionalExtension};
use veil_core::errors::StorageError;

use crate::connection::map_sqlite_error;

pub const KEY_CHECK: &str = "key_check";

pub fn get(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
    conn.prepare_cached("SELECT value FROM store_meta WHERE key = ?1")
        .map_err(map_sqlite_error)?
        .query_row(params![key], |row| row.get(0))
        .optional()
        .map_err(map_sqlite_error)
}

pub fn put(conn: &Connection, key: &str, value: &[u8]) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO store_meta (key, value) VALUES (?1, ?2)",
        params![key, value],
    )
    .map_err(map_sqlite_error)?;
    Ok(())
}
