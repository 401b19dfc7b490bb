//! Exclusion filter: structural zones (emails, URLs, handles, configured
//! patterns) whose contents are never treated as personal names, whatever
//! the detector labeled them.

pub mod patterns;

use std::ops::Range;

use regex::Regex;

use veil_core::config::ExclusionConfig;
use veil_core::errors::ConfigError;
use veil_core::types::{Document, Span};

use crate::degradation::DegradationTracker;

/// One match of an exclusion pattern, as a byte range into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionZone {
    pub pattern_name: String,
    pub range: Range<usize>,
}

/// Zones of one document, sorted by start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionZones {
    zones: Vec<ExclusionZone>,
}

impl ExclusionZones {
    /// Zone overlapping the byte range, if any.
    pub fn covering(&self, range: &Range<usize>) -> Option<&ExclusionZone> {
        self.zones
            .iter()
            .take_while(|z| z.range.start < range.end)
            .find(|z| z.range.end > range.start)
    }

    pub fn zones(&self) -> &[ExclusionZone] {
        &self.zones
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    name: String,
    regex: Regex,
}

/// Compiled exclusion patterns. Built once, shared read-only by workers.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<CompiledPattern>,
    degradation: DegradationTracker,
}

impl ExclusionFilter {
    /// Build from configuration. Patterns that fail to compile are skipped,
    /// logged, and recorded in [`ExclusionFilter::degradation`].
    pub fn from_config(config: &ExclusionConfig) -> Self {
        let mut degradation = DegradationTracker::new();
        let mut compiled = Self::builtin_patterns(config, &mut degradation);

        for pattern in &config.patterns {
            match Regex::new(&pattern.regex) {
                Ok(regex) => compiled.push(CompiledPattern {
                    name: pattern.name.clone(),
                    regex,
                }),
                Err(e) => {
                    tracing::warn!(
                        pattern = %pattern.name,
                        error = %e,
                        "skipping exclusion pattern that failed to compile"
                    );
                    degradation.record_failure(&pattern.name, "configured", &e.to_string());
                }
            }
        }

        Self {
            patterns: compiled,
            degradation,
        }
    }

    /// Like [`ExclusionFilter::from_config`], but a configured pattern that
    /// fails to compile is an error.
    pub fn try_from_config(config: &ExclusionConfig) -> Result<Self, ConfigError> {
        for pattern in &config.patterns {
            Regex::new(&pattern.regex).map_err(|e| ConfigError::InvalidPattern {
                name: pattern.name.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(Self::from_config(config))
    }

    fn builtin_patterns(
        config: &ExclusionConfig,
        degradation: &mut DegradationTracker,
    ) -> Vec<CompiledPattern> {
        if !config.effective_builtin() {
            return Vec::new();
        }
        let mut compiled = Vec::new();
        for pat in patterns::all_patterns() {
            match pat.regex.as_ref() {
                Some(regex) => compiled.push(CompiledPattern {
                    name: pat.name.to_string(),
                    regex: regex.clone(),
                }),
                None => {
                    tracing::warn!(pattern = pat.name, "built-in exclusion pattern unavailable");
                    degradation.record_failure(pat.name, "builtin", "regex compilation failed");
                }
            }
        }
        compiled
    }

    pub fn degradation(&self) -> &DegradationTracker {
        &self.degradation
    }

    pub fn pattern_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// All exclusion zones of a document. Computed once per document.
    pub fn zones(&self, document: &Document) -> ExclusionZones {
        let mut zones: Vec<ExclusionZone> = self
            .patterns
            .iter()
            .flat_map(|p| {
                p.regex.find_iter(&document.text).map(move |m| ExclusionZone {
                    pattern_name: p.name.clone(),
                    range: m.range(),
                })
            })
            .collect();
        zones.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(b.range.end.cmp(&a.range.end))
        });
        ExclusionZones { zones }
    }

    /// Whether the detector text itself has an excluded shape
    /// (`marie.dubois@example.fr` labeled as a person).
    pub fn matches_text(&self, raw_text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.regex.is_match(raw_text))
            .map(|p| p.name.as_str())
    }

    /// Whether an occurrence must be suppressed: its own text has an excluded
    /// shape, or its span overlaps an exclusion zone of the document.
    pub fn is_excluded(&self, raw_text: &str, span: Span, document: &Document) -> bool {
        self.is_excluded_in(raw_text, span, document, &self.zones(document))
    }

    /// [`ExclusionFilter::is_excluded`] against precomputed zones.
    pub fn is_excluded_in(
        &self,
        raw_text: &str,
        span: Span,
        document: &Document,
        zones: &ExclusionZones,
    ) -> bool {
        if self.matches_text(raw_text).is_some() {
            return true;
        }
        match document.byte_range(span) {
            Some(range) if !range.is_empty() => zones.covering(&range).is_some(),
            _ => false,
        }
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::from_config(&ExclusionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covering_uses_overlap() {
        let zones = ExclusionZones {
            zones: vec![
                ExclusionZone {
                    pattern_name: "email".into(),
                    range: 10..20,
                },
                ExclusionZone {
                    pattern_name: "url".into(),
                    range: 40..60,
                },
            ],
        };
        assert!(zones.covering(&(5..11)).is_some());
        assert!(zones.covering(&(19..25)).is_some());
        assert!(zones.covering(&(20..40)).is_none());
        assert_eq!(zones.covering(&(45..46)).map(|z| z.pattern_name.as_str()), Some("url"));
    }
}
