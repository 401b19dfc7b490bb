//! Graceful degradation for the exclusion filter.
//!
//! If a pattern fails to compile, it is skipped with a warning and the
//! filter continues with the remaining patterns. The tracker records the gap
//! so callers can report it.

/// Record of a pattern that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailure {
    pub pattern_name: String,
    /// `builtin` or `configured`.
    pub origin: String,
    pub error: String,
}

/// Accumulates pattern failures while an exclusion filter is built.
#[derive(Debug, Clone, Default)]
pub struct DegradationTracker {
    failures: Vec<PatternFailure>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, pattern_name: &str, origin: &str, error: &str) {
        self.failures.push(PatternFailure {
            pattern_name: pattern_name.to_string(),
            origin: origin.to_string(),
            error: error.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures(&self) -> &[PatternFailure] {
        &self.failures
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}
