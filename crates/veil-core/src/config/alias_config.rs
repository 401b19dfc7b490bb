//! Per-entity-type alias naming schemes.

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::types::EntityType;

/// How aliases are generated for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum AliasScheme {
    /// `{prefix}{n}` for n = 1, 2, … up to `capacity`.
    Sequential {
        prefix: String,
        #[serde(default = "default_capacity")]
        capacity: u64,
    },
    /// Deterministic pick from a fixed list of pseudo-names, seeded by the
    /// canonical key and stepped linearly on collision.
    NamePool { names: Vec<String> },
}

fn default_capacity() -> u64 {
    defaults::DEFAULT_SEQUENTIAL_CAPACITY
}

impl AliasScheme {
    /// Number of distinct aliases this scheme can produce.
    pub fn capacity(&self) -> u64 {
        match self {
            Self::Sequential { capacity, .. } => *capacity,
            Self::NamePool { names } => names.len() as u64,
        }
    }

    pub fn default_for(entity_type: EntityType) -> Self {
        let prefix = match entity_type {
            EntityType::Person => defaults::DEFAULT_PERSON_PREFIX,
            EntityType::Location => defaults::DEFAULT_LOCATION_PREFIX,
            EntityType::Org => defaults::DEFAULT_ORG_PREFIX,
        };
        Self::Sequential {
            prefix: prefix.to_string(),
            capacity: defaults::DEFAULT_SEQUENTIAL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AliasConfig {
    pub person: Option<AliasScheme>,
    pub location: Option<AliasScheme>,
    pub org: Option<AliasScheme>,
}

impl AliasConfig {
    pub fn scheme(&self, entity_type: EntityType) -> Option<&AliasScheme> {
        match entity_type {
            EntityType::Person => self.person.as_ref(),
            EntityType::Location => self.location.as_ref(),
            EntityType::Org => self.org.as_ref(),
        }
    }

    /// Returns the configured scheme, defaulting to `{TYPE}_{n}` sequential ids.
    pub fn effective_scheme(&self, entity_type: EntityType) -> AliasScheme {
        self.scheme(entity_type)
            .cloned()
            .unwrap_or_else(|| AliasScheme::default_for(entity_type))
    }
}
