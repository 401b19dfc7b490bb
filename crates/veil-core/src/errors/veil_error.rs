//! Aggregate error and propagation policy.

use super::error_code::{self, VeilErrorCode};
use super::{AliasError, CipherError, ConfigError, NormalizeError, ReviewError, StorageError};

/// Any error veil can produce. Aggregates subsystem errors via `From`.
#[derive(Debug, thiserror::Error)]
pub enum VeilError {
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Alias error: {0}")]
    Alias(#[from] AliasError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl VeilError {
    /// Retry with backoff before giving up.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_transient())
    }

    /// Aborts the whole batch: continuing would risk inconsistent aliases.
    ///
    /// Normalization, alias, review, and single-entry corruption errors stay
    /// scoped to their occurrence, entity type, group, or key.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Normalize(_) | Self::Alias(_) | Self::Review(_) => false,
            Self::Storage(StorageError::Corruption { .. }) => false,
            Self::Storage(_) => true,
            Self::Cipher(CipherError::InvalidKey { .. }) => true,
            Self::Cipher(_) => false,
            Self::Config(_) | Self::Cancelled => true,
        }
    }
}

impl VeilErrorCode for VeilError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Normalize(e) => e.error_code(),
            Self::Alias(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Cipher(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Review(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

pub type VeilResult<T> = Result<T, VeilError>;
