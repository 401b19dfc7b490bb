//! Normalizer configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Honorific prefixes to strip. Default: French and English titles,
    /// singular and plural.
    pub honorifics: Option<Vec<String>>,
}

impl NormalizerConfig {
    pub fn effective_honorifics(&self) -> Vec<String> {
        match &self.honorifics {
            Some(list) => list.clone(),
            None => defaults::DEFAULT_HONORIFICS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
