//! Write connection utilities: BEGIN IMMEDIATE transactions.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use veil_core::errors::StorageError;

use super::map_sqlite_error;

/// Execute a write operation inside a BEGIN IMMEDIATE transaction.
///
/// The write lock is taken at transaction start, so the read-check-insert
/// inside `f` cannot interleave with another writer, in this process or any
/// other. Lock contention surfaces as `StorageError::Busy`. Any error from
/// `f` rolls the transaction back.
pub fn with_immediate_transaction<F, T, E>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<StorageError>,
{
    // `new_unchecked` only needs `&Connection`; dropping the transaction
    // uncommitted rolls back.
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(map_sqlite_error)?;

    let result = f(&tx)?;

    tx.commit().map_err(map_sqlite_error)?;

    Ok(result)
}
