//! Resolver configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What to do with an occurrence that matches several known entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Surface the ambiguity to review; no alias until someone picks.
    #[default]
    Hold,
    /// No disambiguation signal is available: mint a fresh entity.
    TreatAsNew,
}

impl AmbiguityPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hold" => Some(Self::Hold),
            "treat_as_new" | "new" => Some(Self::TreatAsNew),
            _ => None,
        }
    }
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hold => f.write_str("hold"),
            Self::TreatAsNew => f.write_str("treat_as_new"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Default: hold.
    pub ambiguity: Option<AmbiguityPolicy>,
}

impl ResolutionConfig {
    pub fn effective_ambiguity(&self) -> AmbiguityPolicy {
        self.ambiguity.unwrap_or_default()
    }
}
