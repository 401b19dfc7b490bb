//! Deterministic cipher errors.

use super::error_code::{self, VeilErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("Invalid cipher key: {reason}")]
    InvalidKey { reason: String },

    #[error("Failed to seal value: {message}")]
    Seal { message: String },

    #[error("Failed to open sealed value: {message}")]
    Open { message: String },
}

impl VeilErrorCode for CipherError {
    fn error_code(&self) -> &'static str {
        error_code::CIPHER_ERROR
    }
}
