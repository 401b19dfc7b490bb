//! Mapping store errors.

use super::error_code::{self, VeilErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Mapping store unavailable: {message}")]
    Unavailable { message: String },

    /// Transient lock contention. Retried by the store; never escapes a
    /// `find_or_create` call except as `WriteConflict`.
    #[error("Mapping store busy: {message}")]
    Busy { message: String },

    #[error("Mapping store write conflict after {attempts} attempts: {message}")]
    WriteConflict { attempts: u32, message: String },

    #[error("Corrupted mapping entry (seq {seq}): {details}")]
    Corruption { seq: u64, details: String },

    #[error("Mapping store was created with a different encryption key")]
    KeyMismatch,

    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },
}

impl StorageError {
    /// Worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

impl VeilErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => error_code::STORE_UNAVAILABLE,
            Self::Busy { .. } => error_code::STORE_BUSY,
            Self::WriteConflict { .. } => error_code::STORE_WRITE_CONFLICT,
            Self::Corruption { .. } => error_code::STORE_CORRUPTION,
            Self::KeyMismatch => error_code::STORE_KEY_MISMATCH,
            Self::SqliteError { .. } => error_code::STORAGE_ERROR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
        }
    }
}
