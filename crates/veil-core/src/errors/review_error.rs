//! Errors raised while recording review decisions.

use super::error_code::{self, VeilErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("A decision was already recorded for group {group}")]
    DecisionAlreadyRecorded { group: String },

    #[error("Group {group} is not ambiguous")]
    NotAmbiguous { group: String },

    #[error("{candidate} is not a candidate of group {group}")]
    UnknownCandidate { group: String, candidate: String },

    #[error("No group at index {index} (document has {count} groups)")]
    UnknownGroup { index: usize, count: usize },
}

impl VeilErrorCode for ReviewError {
    fn error_code(&self) -> &'static str {
        error_code::REVIEW_ERROR
    }
}
