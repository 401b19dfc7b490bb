//! Stable error codes for downstream reporting.

/// Every veil error enum maps to a code string that reports and review
/// tooling can match on without parsing messages.
pub trait VeilErrorCode {
    /// Returns the code string (e.g., "STORE_UNAVAILABLE").
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const INVALID_ENTITY_TEXT: &str = "INVALID_ENTITY_TEXT";
pub const INVALID_SPAN: &str = "INVALID_SPAN";
pub const ALIAS_SPACE_EXHAUSTED: &str = "ALIAS_SPACE_EXHAUSTED";
pub const ALIAS_TAKEN: &str = "ALIAS_TAKEN";
pub const EMPTY_ALIAS: &str = "EMPTY_ALIAS";
pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
pub const STORE_BUSY: &str = "STORE_BUSY";
pub const STORE_WRITE_CONFLICT: &str = "STORE_WRITE_CONFLICT";
pub const STORE_CORRUPTION: &str = "STORE_CORRUPTION";
pub const STORE_KEY_MISMATCH: &str = "STORE_KEY_MISMATCH";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const CIPHER_ERROR: &str = "CIPHER_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const REVIEW_ERROR: &str = "REVIEW_ERROR";
pub const CANCELLED: &str = "CANCELLED";
