//! Occurrence deduplication: group resolved occurrences by canonical key,
//! take one decision per group, fan it out to every member span.

pub mod group;
pub mod plan;

use std::collections::HashMap;
use std::sync::Arc;

use veil_core::errors::{VeilErrorCode, VeilResult};
use veil_core::traits::{Cancellable, MappingStore};
use veil_core::types::{CanonicalEntity, CanonicalKey, Decision, Resolution};

use crate::alias::AliasAssigner;

pub use group::{OccurrenceGroup, ResolvedOccurrence};
pub use plan::{Substitution, SubstitutionPlan, SubstitutionStatus};

/// Takes the decision for each occurrence group.
pub trait Reviewer: Send + Sync {
    fn review(&self, group: &OccurrenceGroup) -> Decision;

    /// Candidate to bind an ambiguous group to, if the reviewer can tell.
    fn disambiguate(&self, _group: &OccurrenceGroup) -> Option<CanonicalKey> {
        None
    }
}

/// Unattended review: confirms every group that resolves to one entity,
/// leaves ambiguous groups pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoReviewer;

impl Reviewer for AutoReviewer {
    fn review(&self, group: &OccurrenceGroup) -> Decision {
        if group.is_ambiguous() {
            Decision::Pending
        } else {
            Decision::Confirmed
        }
    }
}

/// Group occurrences by the key they resolve to, in order of first
/// appearance.
pub fn group(occurrences: &[ResolvedOccurrence]) -> Vec<OccurrenceGroup> {
    let mut index: HashMap<&CanonicalKey, usize> = HashMap::new();
    let mut groups: Vec<OccurrenceGroup> = Vec::new();
    for occurrence in occurrences {
        match index.get(occurrence.group_key()) {
            Some(&i) => groups[i].push(occurrence),
            None => {
                index.insert(occurrence.group_key(), groups.len());
                groups.push(OccurrenceGroup::start(occurrence));
            }
        }
    }
    groups
}

/// Substitutions for one group, and whether planning it wrote a store entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupOutcome {
    pub substitutions: Vec<Substitution>,
    pub created: bool,
}

/// Applies recorded decisions against the mapping store.
pub struct Deduplicator {
    store: Arc<dyn MappingStore>,
    assigner: Arc<AliasAssigner>,
}

impl Deduplicator {
    pub fn new(store: Arc<dyn MappingStore>, assigner: Arc<AliasAssigner>) -> Self {
        Self { store, assigner }
    }

    /// Record `decision` on the group and turn it into one substitution per
    /// member.
    pub fn apply_decision(
        &self,
        group_index: usize,
        group: &mut OccurrenceGroup,
        decision: Decision,
        cancel: &dyn Cancellable,
    ) -> VeilResult<GroupOutcome> {
        group.record_decision(decision)?;
        self.plan_group(group_index, group, cancel)
    }

    /// Substitutions for the decision already recorded on the group.
    ///
    /// Confirmed and Edited groups go through `find_or_create` once, which
    /// writes an entry only when the key has none. Errors scoped to the group
    /// (exhausted alias space, corrupted entry, alias collision) become
    /// `Failed` substitutions; fatal store errors are returned.
    pub fn plan_group(
        &self,
        group_index: usize,
        group: &OccurrenceGroup,
        cancel: &dyn Cancellable,
    ) -> VeilResult<GroupOutcome> {
        let (status, created) = self.status_for(group, cancel)?;
        let substitutions = group
            .members
            .iter()
            .map(|m| Substitution {
                span: m.span(),
                original: m.text.clone(),
                group: group_index,
                status: status.clone(),
            })
            .collect();
        Ok(GroupOutcome {
            substitutions,
            created,
        })
    }

    fn status_for(
        &self,
        group: &OccurrenceGroup,
        cancel: &dyn Cancellable,
    ) -> VeilResult<(SubstitutionStatus, bool)> {
        let outcome = match group.decision() {
            Decision::Pending => return Ok((SubstitutionStatus::Pending, false)),
            Decision::Rejected => return Ok((SubstitutionStatus::Rejected, false)),
            Decision::Confirmed => match group.target_key() {
                Some(key) => {
                    cancel.check()?;
                    self.confirmed_alias(key, group)
                }
                None => return Ok((SubstitutionStatus::Ambiguous, false)),
            },
            Decision::Edited(text) => match group.target_key() {
                Some(key) => {
                    cancel.check()?;
                    self.edited_alias(key, text)
                }
                // Nothing to record for an unbound group: the edit applies to
                // these spans only.
                None => Ok((text.clone(), false)),
            },
        };

        match outcome {
            Ok((replacement, created)) => {
                Ok((SubstitutionStatus::Substituted { replacement }, created))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(
                    entity_type = %group.entity_type,
                    code = e.error_code(),
                    error = %e,
                    "occurrence group left unsubstituted"
                );
                let code = e.error_code().to_string();
                Ok((SubstitutionStatus::Failed { code }, false))
            }
        }
    }

    fn confirmed_alias(
        &self,
        key: &CanonicalKey,
        group: &OccurrenceGroup,
    ) -> VeilResult<(String, bool)> {
        let entity = if matches!(group.resolution, Resolution::ComponentOf(_)) {
            CanonicalEntity::from_store(key.clone())
        } else {
            let document_id = group
                .members
                .first()
                .map(|m| m.document_id.clone())
                .unwrap_or_default();
            CanonicalEntity::observed(key.clone(), group.representative_text.clone(), document_id)
        };
        let outcome = self
            .store
            .find_or_create(key, &mut |ledger| self.assigner.assign(&entity, ledger))?;
        Ok((outcome.alias, outcome.created))
    }

    /// The edited text is what the members get. It becomes the stored alias
    /// only when the key has no entry yet; an existing alias is kept.
    fn edited_alias(&self, key: &CanonicalKey, text: &str) -> VeilResult<(String, bool)> {
        let outcome = self
            .store
            .find_or_create(key, &mut |_| Ok(text.to_string()))?;
        if !outcome.created && outcome.alias != text {
            tracing::debug!(
                entity_type = %key.entity_type,
                "edited text not stored: key already has an alias"
            );
        }
        Ok((text.to_string(), outcome.created))
    }
}
