//! Alias assignment errors.

use super::error_code::{self, VeilErrorCode};
use crate::types::EntityType;

#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    #[error("Alias space exhausted for {entity_type}: all {capacity} aliases are assigned")]
    AliasSpaceExhausted { entity_type: EntityType, capacity: u64 },

    #[error("Alias {alias:?} is already assigned to another {entity_type} entity")]
    AliasTaken { entity_type: EntityType, alias: String },

    #[error("Empty alias produced for {entity_type}")]
    EmptyAlias { entity_type: EntityType },
}

impl VeilErrorCode for AliasError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AliasSpaceExhausted { .. } => error_code::ALIAS_SPACE_EXHAUSTED,
            Self::AliasTaken { .. } => error_code::ALIAS_TAKEN,
            Self::EmptyAlias { .. } => error_code::EMPTY_ALIAS,
        }
    }
}
