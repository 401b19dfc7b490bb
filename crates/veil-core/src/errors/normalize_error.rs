//! Normalization errors. Always scoped to one occurrence.

use super::error_code::{self, VeilErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Invalid entity text: {text:?} is empty after normalization")]
    InvalidEntityText { text: String },

    #[error("Invalid span [{start}, {end}) for a document of {len} characters")]
    InvalidSpan { start: usize, end: usize, len: usize },
}

impl VeilErrorCode for NormalizeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEntityText { .. } => error_code::INVALID_ENTITY_TEXT,
            Self::InvalidSpan { .. } => error_code::INVALID_SPAN,
        }
    }
}
