//! Substitution plans: what replaces each occurrence span, if anything.

use std::collections::BTreeMap;

use serde::Serialize;

use veil_core::types::{Document, Span};

/// Why an occurrence is or is not replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubstitutionStatus {
    Substituted { replacement: String },
    /// The reviewer rejected the group.
    Rejected,
    /// No decision recorded.
    Pending,
    /// Confirmed, but the group still matches several entities.
    Ambiguous,
    /// The group could not be aliased (exhausted alias space, corrupted
    /// entry, alias collision). `code` is the error code.
    Failed { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub span: Span,
    pub original: String,
    /// Index of the occurrence group in review order.
    pub group: usize,
    #[serde(flatten)]
    pub status: SubstitutionStatus,
}

impl Substitution {
    pub fn replacement(&self) -> Option<&str> {
        match &self.status {
            SubstitutionStatus::Substituted { replacement } => Some(replacement),
            _ => None,
        }
    }
}

/// Every occurrence of one document with its outcome, sorted by span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubstitutionPlan {
    pub document_id: String,
    substitutions: Vec<Substitution>,
}

impl SubstitutionPlan {
    pub fn new(document_id: impl Into<String>, mut substitutions: Vec<Substitution>) -> Self {
        substitutions.sort_by_key(|s| (s.span, s.group));
        Self {
            document_id: document_id.into(),
            substitutions,
        }
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    pub fn len(&self) -> usize {
        self.substitutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }

    /// Span → replacement text, `None` where the occurrence stays as written.
    pub fn replacements(&self) -> BTreeMap<Span, Option<&str>> {
        self.substitutions
            .iter()
            .map(|s| (s.span, s.replacement()))
            .collect()
    }

    pub fn substituted_count(&self) -> usize {
        self.substitutions
            .iter()
            .filter(|s| s.replacement().is_some())
            .count()
    }

    /// Rewrite the document text. Where replaced spans overlap, the one
    /// starting first wins, and the longer one on a tie, so a nested
    /// detection never leaves part of the outer span behind.
    pub fn apply_to(&self, document: &Document) -> String {
        let mut replaced: Vec<(&Substitution, &str)> = self
            .substitutions
            .iter()
            .filter_map(|s| s.replacement().map(|r| (s, r)))
            .collect();
        replaced.sort_by_key(|(s, _)| (s.span.start, std::cmp::Reverse(s.span.end)));

        let mut kept = Vec::with_capacity(replaced.len());
        let mut reached = 0;
        for (sub, replacement) in replaced {
            if sub.span.start < reached {
                tracing::debug!(
                    start = sub.span.start,
                    end = sub.span.end,
                    "skipping overlapping substitution"
                );
                continue;
            }
            reached = sub.span.end;
            kept.push((sub.span, replacement));
        }

        // From the end, so earlier offsets stay valid.
        let mut text = document.text.clone();
        for (span, replacement) in kept.into_iter().rev() {
            if let Some(range) = document.byte_range(span) {
                text.replace_range(range, replacement);
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(start: usize, end: usize, replacement: Option<&str>) -> Substitution {
        Substitution {
            span: Span::new(start, end),
            original: String::new(),
            group: 0,
            status: match replacement {
                Some(r) => SubstitutionStatus::Substituted {
                    replacement: r.to_string(),
                },
                None => SubstitutionStatus::Rejected,
            },
        }
    }

    #[test]
    fn apply_rewrites_right_to_left() {
        let doc = Document::new("d", "Hélène voit Dubois à Orléans.");
        let plan = SubstitutionPlan::new(
            "d",
            vec![
                sub(21, 28, Some("LOCATION_1")),
                sub(0, 6, Some("PERSON_1")),
                sub(12, 18, None),
            ],
        );
        assert_eq!(plan.apply_to(&doc), "PERSON_1 voit Dubois à LOCATION_1.");
        assert_eq!(plan.substituted_count(), 2);
    }

    #[test]
    fn outer_span_wins_over_a_nested_one() {
        let doc = Document::new("d", "Dr. Marie Dubois est là.");
        let plan = SubstitutionPlan::new(
            "d",
            vec![sub(4, 16, Some("PERSON_2")), sub(0, 16, Some("PERSON_1"))],
        );
        assert_eq!(plan.apply_to(&doc), "PERSON_1 est là.");
    }

    #[test]
    fn crossing_spans_keep_the_first() {
        let doc = Document::new("d", "Marie Dubois Martin");
        let plan = SubstitutionPlan::new(
            "d",
            vec![sub(0, 12, Some("PERSON_1")), sub(6, 19, Some("PERSON_2"))],
        );
        assert_eq!(plan.apply_to(&doc), "PERSON_1 Martin");
    }

    #[test]
    fn a_rejected_outer_span_does_not_hide_a_replaced_inner_one() {
        let doc = Document::new("d", "Dr. Marie Dubois");
        let plan = SubstitutionPlan::new(
            "d",
            vec![sub(0, 16, None), sub(4, 16, Some("PERSON_1"))],
        );
        assert_eq!(plan.apply_to(&doc), "Dr. PERSON_1");
    }
}
