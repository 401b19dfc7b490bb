use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of named entity reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Person,
    Location,
    Org,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [EntityType::Person, EntityType::Location, EntityType::Org];

    /// Stable tag used in storage and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Location => "LOCATION",
            Self::Org => "ORG",
        }
    }

    /// Parse a tag, case-insensitively. Accepts the common detector spellings
    /// (`PER`, `LOC`, `ORGANIZATION`) alongside the canonical ones.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "PERSON" | "PER" => Some(Self::Person),
            "LOCATION" | "LOC" => Some(Self::Location),
            "ORG" | "ORGANIZATION" | "ORGANISATION" => Some(Self::Org),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
