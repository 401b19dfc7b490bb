//! Canonical identity of an entity, independent of surface form.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::EntityType;
use crate::constants::KEY_SEPARATOR;

/// `(normalized_text, entity_type)` after title stripping and case/diacritic
/// folding. Tokens in `normalized` are separated by single ASCII spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalKey {
    pub entity_type: EntityType,
    pub normalized: String,
}

impl CanonicalKey {
    pub fn new(entity_type: EntityType, normalized: impl Into<String>) -> Self {
        Self {
            entity_type,
            normalized: normalized.into(),
        }
    }

    /// Ordered tokens of the normalized text.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.normalized.split(' ').filter(|t| !t.is_empty())
    }

    /// Plaintext form handed to the cipher before persisting.
    pub fn to_storage_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(self.normalized.len() + 10);
        out.push_str(self.entity_type.as_str());
        out.push(KEY_SEPARATOR);
        out.push_str(&self.normalized);
        out.into_bytes()
    }

    /// Inverse of [`CanonicalKey::to_storage_bytes`]. `None` means the bytes
    /// did not come from a canonical key.
    pub fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(bytes).ok()?;
        let (tag, normalized) = text.split_once(KEY_SEPARATOR)?;
        let entity_type = EntityType::parse(tag)?;
        if normalized.is_empty() {
            return None;
        }
        Some(Self::new(entity_type, normalized))
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.normalized)
    }
}

/// The unit of identity an occurrence resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub key: CanonicalKey,
    /// Ordered tokens of the fullest surface form seen.
    pub component_tokens: Vec<String>,
    /// Fullest original surface form seen, kept for display only.
    pub display_text: String,
    /// `None` when the entity was learned from the mapping store.
    pub first_seen_document_id: Option<String>,
}

impl CanonicalEntity {
    /// Entity first seen in a document.
    pub fn observed(
        key: CanonicalKey,
        display_text: impl Into<String>,
        document_id: impl Into<String>,
    ) -> Self {
        let component_tokens = key.tokens().map(str::to_string).collect();
        Self {
            key,
            component_tokens,
            display_text: display_text.into(),
            first_seen_document_id: Some(document_id.into()),
        }
    }

    /// Entity known only through its mapping store entry.
    pub fn from_store(key: CanonicalKey) -> Self {
        let component_tokens = key.tokens().map(str::to_string).collect();
        let display_text = key.normalized.clone();
        Self {
            key,
            component_tokens,
            display_text,
            first_seen_document_id: None,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.key.entity_type
    }

    /// Keep the longest surface form as the display text.
    pub fn observe_surface(&mut self, surface: &str) {
        if surface.chars().count() > self.display_text.chars().count() {
            self.display_text = surface.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_bytes_round_trip_and_reject_garbage() {
        let key = CanonicalKey::new(EntityType::Person, "marie dubois");
        let bytes = key.to_storage_bytes();
        assert_eq!(CanonicalKey::from_storage_bytes(&bytes), Some(key));
        assert_eq!(CanonicalKey::from_storage_bytes(b"marie dubois"), None);
        assert_eq!(CanonicalKey::from_storage_bytes(b"ALIEN\x1fx"), None);
        assert_eq!(CanonicalKey::from_storage_bytes(&[0xff, 0xfe]), None);
    }

    #[test]
    fn entity_tokens_follow_key() {
        let entity = CanonicalEntity::from_store(CanonicalKey::new(
            EntityType::Person,
            "jean pierre martin",
        ));
        assert_eq!(entity.component_tokens, vec!["jean", "pierre", "martin"]);
        assert_eq!(entity.first_seen_document_id, None);
    }
}
