//! Schema migrations using PRAGMA user_version.
//!
//! The schema is a contract with every store file already written: existing
//! migrations are never edited, only appended.

pub mod v001_mapping_entries;

use rusqlite::Connection;
use veil_core::constants::SCHEMA_VERSION;
use veil_core::errors::StorageError;

use crate::connection::writer::with_immediate_transaction;

const MIGRATIONS: &[(&str, u32)] = &[(v001_mapping_entries::MIGRATION_SQL, 1)];

/// Run all pending migrations in one immediate transaction, so processes
/// opening the same file concurrently apply each migration exactly once.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    with_immediate_transaction(conn, |tx| {
        let current_version = current_version(tx).map_err(|e| StorageError::MigrationFailed {
            version: 0,
            message: e.to_string(),
        })?;

        if current_version > SCHEMA_VERSION {
            return Err(StorageError::MigrationFailed {
                version: current_version,
                message: format!(
                    "store schema v{current_version} is newer than supported v{SCHEMA_VERSION}"
                ),
            });
        }

        for (sql, version) in MIGRATIONS {
            if current_version < *version {
                tx.execute_batch(sql).map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
                tx.pragma_update(None, "user_version", version)
                    .map_err(|e| StorageError::MigrationFailed {
                        version: *version,
                        message: e.to_string(),
                    })?;
                tracing::info!(version = version, "applied migration");
            }
        }
        Ok(())
    })
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
