//! Occurrence groups: every occurrence of one canonical entity in one
//! processing scope, carrying a single review decision.

use serde::Serialize;

use veil_core::errors::ReviewError;
use veil_core::types::{CanonicalKey, Decision, EntityType, RawOccurrence, Resolution, Span};

/// A raw occurrence after normalization and resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOccurrence {
    pub occurrence: RawOccurrence,
    /// Trimmed surface form.
    pub display: String,
    /// Own canonical key, before binding.
    pub key: CanonicalKey,
    pub resolution: Resolution,
    /// Whether the bound key already had a mapping store entry when the
    /// occurrence was resolved.
    pub stored: bool,
}

impl ResolvedOccurrence {
    /// Key the occurrence is grouped under: the entity it binds to, or its
    /// own key when it is new or ambiguous.
    pub fn group_key(&self) -> &CanonicalKey {
        self.resolution.target().unwrap_or(&self.key)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OccurrenceGroup {
    pub canonical_key: CanonicalKey,
    pub entity_type: EntityType,
    /// Fullest surface form among the members.
    pub representative_text: String,
    /// Insertion order.
    pub members: Vec<RawOccurrence>,
    /// `New` when the key has no store entry yet, `ExactMatch` when it has,
    /// `Ambiguous` until disambiguated, `ComponentOf` once bound to a
    /// candidate.
    pub resolution: Resolution,
    decision: Decision,
}

impl OccurrenceGroup {
    pub(crate) fn start(first: &ResolvedOccurrence) -> Self {
        let resolution = match &first.resolution {
            Resolution::Ambiguous(candidates) => Resolution::Ambiguous(candidates.clone()),
            _ if first.stored => Resolution::ExactMatch(first.group_key().clone()),
            _ => Resolution::New,
        };
        Self {
            canonical_key: first.group_key().clone(),
            entity_type: first.key.entity_type,
            representative_text: first.display.clone(),
            members: vec![first.occurrence.clone()],
            resolution,
            decision: Decision::Pending,
        }
    }

    pub(crate) fn push(&mut self, member: &ResolvedOccurrence) {
        if member.display.chars().count() > self.representative_text.chars().count() {
            self.representative_text = member.display.clone();
        }
        self.members.push(member.occurrence.clone());
    }

    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.members.iter().map(RawOccurrence::span)
    }

    pub fn is_ambiguous(&self) -> bool {
        self.resolution.is_ambiguous()
    }

    /// Candidates of an ambiguous group; empty otherwise.
    pub fn candidates(&self) -> &[CanonicalKey] {
        match &self.resolution {
            Resolution::Ambiguous(candidates) => candidates,
            _ => &[],
        }
    }

    /// Key whose alias the group receives, `None` while ambiguous.
    pub fn target_key(&self) -> Option<&CanonicalKey> {
        match &self.resolution {
            Resolution::Ambiguous(_) => None,
            Resolution::ComponentOf(key) => Some(key),
            Resolution::ExactMatch(_) | Resolution::New => Some(&self.canonical_key),
        }
    }

    /// Record the review decision. Only one decision is ever recorded;
    /// recording `Pending` is a no-op.
    pub fn record_decision(&mut self, decision: Decision) -> Result<(), ReviewError> {
        if decision.is_pending() {
            return Ok(());
        }
        if !self.decision.is_pending() {
            return Err(ReviewError::DecisionAlreadyRecorded {
                group: self.canonical_key.to_string(),
            });
        }
        self.decision = decision;
        Ok(())
    }

    /// Bind an ambiguous group to one of its candidates.
    pub fn disambiguate(&mut self, candidate: &CanonicalKey) -> Result<(), ReviewError> {
        let group = self.canonical_key.to_string();
        match &self.resolution {
            Resolution::Ambiguous(candidates) if candidates.contains(candidate) => {
                self.resolution = Resolution::ComponentOf(candidate.clone());
                Ok(())
            }
            Resolution::Ambiguous(_) => Err(ReviewError::UnknownCandidate {
                group,
                candidate: candidate.to_string(),
            }),
            _ => Err(ReviewError::NotAmbiguous { group }),
        }
    }
}
