//! One document through the pipeline, in two phases.
//!
//! `prepare`: validate spans, drop excluded occurrences, normalize, resolve
//! fullest form first, group. Reads the mapping store, never writes it.
//!
//! `finalize`: turn each group's recorded decision into substitutions,
//! writing one store entry per new canonical entity that gets aliased.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use veil_core::errors::{NormalizeError, ReviewError, StorageError, VeilErrorCode, VeilResult};
use veil_core::traits::{Cancellable, MappingStore};
use veil_core::types::{
    CanonicalEntity, CanonicalKey, Decision, Document, RawOccurrence, Resolution,
};
use veil_privacy::{ExclusionFilter, ExclusionZones, NormalizedText, Normalizer};

use crate::dedup::{self, Deduplicator, OccurrenceGroup, ResolvedOccurrence, SubstitutionPlan};
use crate::resolver::{fullness, EntityIndex, KnownEntities, Layered, Resolver};

use super::report::{DocumentOutcome, DroppedOccurrence, GroupSummary};

/// A document and the detector's occurrences for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub document: Document,
    pub occurrences: Vec<RawOccurrence>,
}

impl DocumentInput {
    pub fn new(document: Document, occurrences: Vec<RawOccurrence>) -> Self {
        Self {
            document,
            occurrences,
        }
    }
}

/// Grouped occurrences waiting for review decisions.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    document: Document,
    groups: Vec<OccurrenceGroup>,
    dropped: Vec<DroppedOccurrence>,
    excluded: usize,
}

impl PreparedDocument {
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Groups in order of first appearance.
    pub fn groups(&self) -> &[OccurrenceGroup] {
        &self.groups
    }

    pub fn dropped(&self) -> &[DroppedOccurrence] {
        &self.dropped
    }

    pub fn excluded(&self) -> usize {
        self.excluded
    }

    pub fn decide(&mut self, index: usize, decision: Decision) -> Result<(), ReviewError> {
        self.group_mut(index)?.record_decision(decision)
    }

    pub fn disambiguate(&mut self, index: usize, candidate: &CanonicalKey) -> Result<(), ReviewError> {
        self.group_mut(index)?.disambiguate(candidate)
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut OccurrenceGroup, ReviewError> {
        let count = self.groups.len();
        self.groups
            .get_mut(index)
            .ok_or(ReviewError::UnknownGroup { index, count })
    }
}

/// Borrowed pipeline components for processing documents.
pub struct DocumentWorker<'a> {
    pub normalizer: &'a Normalizer,
    pub exclusion: &'a ExclusionFilter,
    pub resolver: Resolver,
    /// Entities known from the mapping store, shared by all workers.
    pub known: &'a RwLock<KnownEntities>,
    /// Entities first seen in the batch this document belongs to.
    pub batch: Option<&'a KnownEntities>,
    pub store: &'a dyn MappingStore,
    pub dedup: &'a Deduplicator,
}

struct Candidate {
    occurrence: RawOccurrence,
    normalized: NormalizedText,
}

/// What one raw occurrence turns out to be before resolution.
enum Screened {
    InvalidSpan(String),
    Excluded,
    Unusable(NormalizeError),
    Usable(NormalizedText),
}

impl DocumentWorker<'_> {
    pub fn prepare(&self, input: DocumentInput) -> VeilResult<PreparedDocument> {
        let DocumentInput {
            document,
            occurrences,
        } = input;
        let _span = veil_core::document_span!(document.id, occurrences.len()).entered();

        self.sync_known()?;

        let zones = self.exclusion.zones(&document);
        let char_len = document.char_len();
        let mut dropped = Vec::new();
        let mut excluded = 0;
        let mut candidates = Vec::with_capacity(occurrences.len());

        for occurrence in occurrences {
            match self.screen(&occurrence, &document, char_len, &zones) {
                Screened::InvalidSpan(reason) => {
                    let error = NormalizeError::InvalidSpan {
                        start: occurrence.start,
                        end: occurrence.end,
                        len: char_len,
                    };
                    tracing::warn!(
                        document_id = %document.id,
                        start = occurrence.start,
                        end = occurrence.end,
                        %reason,
                        "dropping occurrence with invalid span"
                    );
                    dropped.push(DroppedOccurrence {
                        occurrence,
                        code: error.error_code().to_string(),
                        reason,
                    });
                }
                Screened::Excluded => {
                    tracing::debug!(
                        document_id = %document.id,
                        start = occurrence.start,
                        "occurrence inside an exclusion zone"
                    );
                    excluded += 1;
                }
                Screened::Unusable(e) => {
                    tracing::warn!(
                        document_id = %document.id,
                        start = occurrence.start,
                        code = e.error_code(),
                        "dropping occurrence with no usable text"
                    );
                    dropped.push(DroppedOccurrence {
                        occurrence,
                        code: e.error_code().to_string(),
                        reason: e.to_string(),
                    });
                }
                Screened::Usable(normalized) => candidates.push(Candidate {
                    occurrence,
                    normalized,
                }),
            }
        }

        let resolved = self.resolve_all(&document.id, candidates)?;
        let groups = dedup::group(&resolved);
        tracing::debug!(
            document_id = %document.id,
            groups = groups.len(),
            dropped = dropped.len(),
            excluded,
            "document prepared"
        );

        Ok(PreparedDocument {
            document,
            groups,
            dropped,
            excluded,
        })
    }

    fn screen(
        &self,
        occurrence: &RawOccurrence,
        document: &Document,
        char_len: usize,
        zones: &ExclusionZones,
    ) -> Screened {
        if let Err(reason) = check_span(occurrence, document, char_len) {
            return Screened::InvalidSpan(reason);
        }
        if self
            .exclusion
            .is_excluded_in(&occurrence.text, occurrence.span(), document, zones)
        {
            return Screened::Excluded;
        }
        match self.normalizer.normalize(&occurrence.text, occurrence.entity_type) {
            Ok(normalized) => Screened::Usable(normalized),
            Err(e) => Screened::Unusable(e),
        }
    }

    /// Entities a batch introduces: every usable occurrence of every
    /// document, fullest form first, that resolves to nothing already in the
    /// store or earlier in this pass. Reads the store, never writes it.
    ///
    /// Resolving each document against this layer makes component binding
    /// the same whatever order the documents are processed in.
    pub fn batch_scope(&self, inputs: &[DocumentInput]) -> VeilResult<KnownEntities> {
        self.sync_known()?;

        let mut forms = Vec::new();
        for input in inputs {
            let document = &input.document;
            let zones = self.exclusion.zones(document);
            let char_len = document.char_len();
            for occurrence in &input.occurrences {
                let screened = self.screen(occurrence, document, char_len, &zones);
                if let Screened::Usable(normalized) = screened {
                    forms.push((occurrence.entity_type, normalized, document.id.as_str()));
                }
            }
        }
        forms.sort_by_key(|(_, normalized, _)| std::cmp::Reverse(fullness(&normalized.tokens)));

        let store_known = self.known.read().map_err(|_| StorageError::Unavailable {
            message: "known entity index lock poisoned".to_string(),
        })?;
        let empty = KnownEntities::new();
        let mut batch = KnownEntities::new();
        for (entity_type, normalized, document_id) in forms {
            let resolution = {
                let scope = Layered {
                    store: &store_known,
                    batch: Some(&batch),
                    local: &empty,
                };
                self.resolver
                    .resolve(&normalized.normalized, entity_type, &normalized.tokens, &scope)
            };
            if resolution == Resolution::New {
                batch.insert(CanonicalEntity::observed(
                    normalized.key(entity_type),
                    normalized.display,
                    document_id,
                ));
            }
        }

        tracing::debug!(
            documents = inputs.len(),
            entities = batch.len(),
            "batch scope built"
        );
        Ok(batch)
    }

    /// Resolve fullest forms first so a bare surname that precedes its full
    /// name in the text still binds to it. Output keeps input order.
    fn resolve_all(
        &self,
        document_id: &str,
        candidates: Vec<Candidate>,
    ) -> VeilResult<Vec<ResolvedOccurrence>> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            fullness(&candidates[b].normalized.tokens)
                .cmp(&fullness(&candidates[a].normalized.tokens))
                .then(a.cmp(&b))
        });

        let store_known = self.known.read().map_err(|_| StorageError::Unavailable {
            message: "known entity index lock poisoned".to_string(),
        })?;
        let mut local = KnownEntities::new();
        let mut resolved: Vec<Option<ResolvedOccurrence>> = vec![None; candidates.len()];

        for i in order {
            let Candidate {
                occurrence,
                normalized,
            } = &candidates[i];
            let entity_type = occurrence.entity_type;
            let key = normalized.key(entity_type);
            let resolution = {
                let scope = Layered {
                    store: &store_known,
                    batch: self.batch,
                    local: &local,
                };
                self.resolver
                    .resolve(&normalized.normalized, entity_type, &normalized.tokens, &scope)
            };
            tracing::debug!(
                document_id,
                entity_type = %entity_type,
                resolution = resolution.label(),
                "resolved occurrence"
            );

            match &resolution {
                Resolution::New => {
                    local.insert(CanonicalEntity::observed(
                        key.clone(),
                        normalized.display.clone(),
                        document_id,
                    ));
                }
                Resolution::ExactMatch(target) | Resolution::ComponentOf(target) => {
                    if let Some(entity) = local.get_mut(target) {
                        entity.observe_surface(&normalized.display);
                    }
                }
                Resolution::Ambiguous(_) => {}
            }

            let stored = resolution
                .target()
                .is_some_and(|target| store_known.contains(target));
            resolved[i] = Some(ResolvedOccurrence {
                occurrence: occurrence.clone(),
                display: normalized.display.clone(),
                key,
                resolution,
                stored,
            });
        }

        Ok(resolved.into_iter().flatten().collect())
    }

    fn sync_known(&self) -> VeilResult<()> {
        let mut known = self.known.write().map_err(|_| StorageError::Unavailable {
            message: "known entity index lock poisoned".to_string(),
        })?;
        let stats = known.sync_from_store(self.store)?;
        if stats.corrupted > 0 {
            tracing::warn!(
                corrupted = stats.corrupted,
                "mapping store has unreadable entries"
            );
        }
        Ok(())
    }

    /// Plan every group from its recorded decision.
    pub fn finalize(
        &self,
        prepared: PreparedDocument,
        cancel: &dyn Cancellable,
    ) -> VeilResult<DocumentOutcome> {
        let PreparedDocument {
            document,
            groups,
            dropped,
            excluded,
        } = prepared;
        let _span = veil_core::document_span!(document.id, groups.len()).entered();

        let mut substitutions = Vec::new();
        let mut entries_created = 0;
        for (index, group) in groups.iter().enumerate() {
            let outcome = self.dedup.plan_group(index, group, cancel)?;
            substitutions.extend(outcome.substitutions);
            if outcome.created {
                entries_created += 1;
            }
        }

        Ok(DocumentOutcome {
            plan: SubstitutionPlan::new(document.id.clone(), substitutions),
            groups: groups.iter().map(GroupSummary::from).collect(),
            document_id: document.id,
            dropped,
            excluded,
            entries_created,
        })
    }
}

/// `Err(reason)` when the occurrence cannot be placed in the document.
fn check_span(occurrence: &RawOccurrence, document: &Document, char_len: usize) -> Result<(), String> {
    if occurrence.document_id != document.id {
        return Err(format!(
            "occurrence belongs to document {:?}",
            occurrence.document_id
        ));
    }
    if occurrence.start >= occurrence.end || occurrence.end > char_len {
        return Err(format!(
            "span [{}, {}) outside a document of {char_len} characters",
            occurrence.start, occurrence.end
        ));
    }
    match document.slice(occurrence.span()) {
        Some(text) if text == occurrence.text => Ok(()),
        Some(_) => Err("span text differs from the occurrence text".to_string()),
        None => Err("span does not map onto the document text".to_string()),
    }
}
