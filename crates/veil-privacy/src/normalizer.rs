//! Honorific stripping and comparison-key folding.
//!
//! `"Dr. Marie Dubois"`, `"MARIE DUBOIS"` and `"Marie  Dubois"` all fold to
//! `marie dubois`. Folding is for comparison only; the surface form is kept
//! verbatim for display.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use veil_core::config::NormalizerConfig;
use veil_core::errors::NormalizeError;
use veil_core::types::{CanonicalKey, EntityType};

/// Result of normalizing one raw occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Surface form as written, trimmed.
    pub display: String,
    /// The honorific that was stripped, as written.
    pub honorific: Option<String>,
    /// Folded comparison text, tokens joined by single spaces.
    pub normalized: String,
    pub tokens: Vec<String>,
}

impl NormalizedText {
    pub fn key(&self, entity_type: EntityType) -> CanonicalKey {
        CanonicalKey::new(entity_type, self.normalized.clone())
    }
}

/// Stateless apart from its honorific list; safe to share across workers.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Sorted longest first so `Dr.` wins over `Dr`.
    honorifics: Vec<String>,
}

impl Normalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self::with_honorifics(config.effective_honorifics())
    }

    pub fn with_honorifics<I, S>(honorifics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut honorifics: Vec<String> = honorifics
            .into_iter()
            .map(Into::into)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        honorifics.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        honorifics.dedup();
        Self { honorifics }
    }

    /// Normalize a raw occurrence text.
    ///
    /// Honorifics are only stripped from `PERSON` occurrences: at most one,
    /// at the very start, and only when followed by whitespace.
    pub fn normalize(
        &self,
        raw_text: &str,
        entity_type: EntityType,
    ) -> Result<NormalizedText, NormalizeError> {
        let display = raw_text.trim();
        let leading = raw_text.trim_start();

        let (honorific, remainder) = match entity_type {
            EntityType::Person => match self.strip_honorific(leading) {
                Some((h, rest)) => (Some(h.to_string()), rest),
                None => (None, leading),
            },
            EntityType::Location | EntityType::Org => (None, leading),
        };

        let normalized = fold(remainder);
        if normalized.is_empty() {
            return Err(NormalizeError::InvalidEntityText {
                text: raw_text.to_string(),
            });
        }
        let tokens = normalized.split(' ').map(str::to_string).collect();

        Ok(NormalizedText {
            display: display.to_string(),
            honorific,
            normalized,
            tokens,
        })
    }

    /// Returns `(honorific as written, remainder)`.
    fn strip_honorific<'a>(&self, text: &'a str) -> Option<(&'a str, &'a str)> {
        self.honorifics.iter().find_map(|h| {
            let end = prefix_len_ignore_case(text, h)?;
            let rest = &text[end..];
            if rest.starts_with(char::is_whitespace) {
                Some((&text[..end], rest.trim_start()))
            } else {
                None
            }
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

/// Byte length of `prefix` at the start of `text`, compared case-insensitively.
fn prefix_len_ignore_case(text: &str, prefix: &str) -> Option<usize> {
    let mut end = 0;
    let mut chars = text.char_indices();
    for p in prefix.chars() {
        let (i, c) = chars.next()?;
        if !c.to_lowercase().eq(p.to_lowercase()) {
            return None;
        }
        end = i + c.len_utf8();
    }
    Some(end)
}

/// Compatibility decomposition, drop combining marks, lowercase, turn
/// anything that is not a letter or digit into a separator, collapse runs.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_removes_diacritics_and_punctuation() {
        assert_eq!(fold("Hélène  Lefèvre-Durand"), "helene lefevre durand");
        assert_eq!(fold("  O'Brien, S.A. "), "o brien s a");
        assert_eq!(fold("ÉCOLE"), "ecole");
        assert_eq!(fold("..."), "");
    }

    #[test]
    fn prefix_match_ignores_case() {
        assert_eq!(prefix_len_ignore_case("MAÎTRE Dupont", "Maître"), Some(7));
        assert_eq!(prefix_len_ignore_case("Ma", "Maître"), None);
    }
}
