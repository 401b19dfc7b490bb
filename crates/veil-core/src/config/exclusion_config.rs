//! Exclusion zone configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

/// A named structural pattern whose matches are never pseudonymized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionPattern {
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExclusionConfig {
    /// Enable the built-in patterns (email, URL, handle). Default: true.
    pub builtin: Option<bool>,
    /// Additional patterns, applied after the built-in ones.
    pub patterns: Vec<ExclusionPattern>,
}

impl ExclusionConfig {
    pub fn effective_builtin(&self) -> bool {
        self.builtin.unwrap_or(defaults::DEFAULT_BUILTIN_EXCLUSIONS)
    }
}
