//! Detector output and the documents it refers to.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::EntityType;

/// Half-open character span `[start, end)` within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether the two spans share at least one position.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// One detected entity span, exactly as the detector reported it.
///
/// Immutable once constructed; the core never rewrites detector output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOccurrence {
    pub text: String,
    pub entity_type: EntityType,
    pub document_id: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

impl RawOccurrence {
    pub fn new(
        text: impl Into<String>,
        entity_type: EntityType,
        document_id: impl Into<String>,
        start: usize,
        end: usize,
        confidence: f64,
    ) -> Self {
        Self {
            text: text.into(),
            entity_type,
            document_id: document_id.into(),
            start,
            end,
            confidence,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// A source document. Offsets everywhere in veil are character offsets into
/// `text`; byte ranges are derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Number of characters in the document.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Convert a character span to a byte range, or `None` when the span is
    /// inverted or runs past the end of the text.
    pub fn byte_range(&self, span: Span) -> Option<Range<usize>> {
        if span.start > span.end {
            return None;
        }
        let mut boundaries = self
            .text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(self.text.len()));
        let start = boundaries.nth(span.start)?;
        let end = if span.end == span.start {
            start
        } else {
            boundaries.nth(span.end - span.start - 1)?
        };
        Some(start..end)
    }

    /// Text covered by a character span.
    pub fn slice(&self, span: Span) -> Option<&str> {
        self.byte_range(span).map(|r| &self.text[r])
    }
}
