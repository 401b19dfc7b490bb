use serde::{Deserialize, Serialize};

use super::CanonicalKey;

/// How a normalized occurrence relates to the canonical entities in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Same normalized text as a known entity.
    ExactMatch(CanonicalKey),
    /// Tokens are a proper subset of exactly one known entity's tokens.
    ComponentOf(CanonicalKey),
    /// No known entity matches; a fresh canonical entity is warranted.
    New,
    /// Tokens are a proper subset of several known entities. Sorted.
    Ambiguous(Vec<CanonicalKey>),
}

impl Resolution {
    /// The existing entity this resolution binds to, if any.
    pub fn target(&self) -> Option<&CanonicalKey> {
        match self {
            Self::ExactMatch(key) | Self::ComponentOf(key) => Some(key),
            Self::New | Self::Ambiguous(_) => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ExactMatch(_) => "exact_match",
            Self::ComponentOf(_) => "component_of",
            Self::New => "new",
            Self::Ambiguous(_) => "ambiguous",
        }
    }
}
