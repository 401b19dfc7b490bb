//! Per-document and per-batch results.

use serde::Serialize;

use veil_core::errors::{VeilError, VeilErrorCode};
use veil_core::types::{CanonicalKey, Decision, EntityType, RawOccurrence};

use crate::dedup::{OccurrenceGroup, SubstitutionPlan};

/// An occurrence that never reached resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedOccurrence {
    pub occurrence: RawOccurrence,
    pub code: String,
    pub reason: String,
}

const AMBIGUOUS: &str = "ambiguous";

/// Review-facing view of one group after finalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub canonical_key: CanonicalKey,
    pub entity_type: EntityType,
    pub representative_text: String,
    pub count: usize,
    pub resolution: String,
    pub decision: Decision,
}

impl From<&OccurrenceGroup> for GroupSummary {
    fn from(group: &OccurrenceGroup) -> Self {
        Self {
            canonical_key: group.canonical_key.clone(),
            entity_type: group.entity_type,
            representative_text: group.representative_text.clone(),
            count: group.len(),
            resolution: group.resolution.label().to_string(),
            decision: group.decision().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentOutcome {
    pub document_id: String,
    pub plan: SubstitutionPlan,
    pub groups: Vec<GroupSummary>,
    pub dropped: Vec<DroppedOccurrence>,
    pub excluded: usize,
    /// Mapping store entries written while finalizing this document.
    pub entries_created: usize,
}

impl DocumentOutcome {
    pub fn ambiguous_groups(&self) -> impl Iterator<Item = &GroupSummary> {
        self.groups
            .iter()
            .filter(|g| g.resolution == AMBIGUOUS)
    }
}

/// A document the batch could not finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub document_id: String,
    pub code: String,
    pub message: String,
}

impl DocumentFailure {
    pub fn new(document_id: impl Into<String>, error: &VeilError) -> Self {
        Self {
            document_id: document_id.into(),
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Finished documents, in input order.
    pub documents: Vec<DocumentOutcome>,
    /// Documents that failed on their own; the batch carried on.
    pub failures: Vec<DocumentFailure>,
    /// Documents never started because the batch was aborted or cancelled.
    pub skipped: Vec<String>,
    /// The store-level error that aborted the batch.
    pub fatal: Option<DocumentFailure>,
}

impl BatchReport {
    pub fn is_aborted(&self) -> bool {
        self.fatal.is_some()
    }

    pub fn entries_created(&self) -> usize {
        self.documents.iter().map(|d| d.entries_created).sum()
    }

    pub fn document(&self, document_id: &str) -> Option<&DocumentOutcome> {
        self.documents.iter().find(|d| d.document_id == document_id)
    }
}
