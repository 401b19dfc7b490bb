//! Review decisions: one per group, fanned out to every member; edits,
//! rejections, disambiguation, and group-scoped failures.

use std::sync::Arc;

use veil_core::config::{AliasConfig, AliasScheme, VeilConfig};
use veil_core::errors::{ReviewError, VeilError};
use veil_core::traits::CancellationToken;
use veil_core::types::{CanonicalKey, Decision, Document, EntityType, RawOccurrence};
use veil_engine::{
    AutoReviewer, DocumentInput, OccurrenceGroup, PseudonymEngine, Reviewer, SubstitutionStatus,
};
use veil_storage::InMemoryMappingStore;

fn engine_with(config: VeilConfig) -> PseudonymEngine {
    PseudonymEngine::new(config, Arc::new(InMemoryMappingStore::new()))
}

fn engine() -> PseudonymEngine {
    engine_with(VeilConfig::default())
}

fn occ(id: &str, text: &str, surface: &str, entity_type: EntityType) -> RawOccurrence {
    let byte = text.find(surface).expect("surface in text");
    let start = text[..byte].chars().count();
    RawOccurrence::new(surface, entity_type, id, start, start + surface.chars().count(), 0.9)
}

fn person(name: &str) -> CanonicalKey {
    CanonicalKey::new(EntityType::Person, name)
}

struct Fixed(Decision);

impl Reviewer for Fixed {
    fn review(&self, _group: &OccurrenceGroup) -> Decision {
        self.0.clone()
    }
}

/// Binds ambiguous groups to a fixed candidate, confirms everything.
struct PickCandidate(CanonicalKey);

impl Reviewer for PickCandidate {
    fn review(&self, _group: &OccurrenceGroup) -> Decision {
        Decision::Confirmed
    }

    fn disambiguate(&self, _group: &OccurrenceGroup) -> Option<CanonicalKey> {
        Some(self.0.clone())
    }
}

#[test]
fn rejected_group_substitutes_nothing_and_writes_nothing() {
    let engine = engine();
    let text = "Marie Dubois et Marie Dubois.";
    let doc = Document::new("d1", text);
    let outcome = engine
        .process_document(
            DocumentInput::new(
                doc.clone(),
                vec![
                    occ("d1", text, "Marie Dubois", EntityType::Person),
                    RawOccurrence::new("Marie Dubois", EntityType::Person, "d1", 16, 28, 0.9),
                ],
            ),
            &Fixed(Decision::Rejected),
            &CancellationToken::new(),
        )
        .unwrap();
    assert!(outcome
        .plan
        .substitutions()
        .iter()
        .all(|s| s.status == SubstitutionStatus::Rejected));
    assert_eq!(outcome.plan.apply_to(&doc), text);
    assert_eq!(engine.store().count().unwrap(), 0);
}

#[test]
fn edited_text_is_recorded_for_a_new_key() {
    let engine = engine();
    let text = "Marie Dubois.";
    engine
        .process_document(
            DocumentInput::new(
                Document::new("d1", text),
                vec![occ("d1", text, "Marie Dubois", EntityType::Person)],
            ),
            &Fixed(Decision::Edited("Madame X".into())),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(
        engine.lookup(&person("marie dubois")).unwrap().as_deref(),
        Some("Madame X")
    );

    // Later confirmations reuse the edited alias.
    let outcome = engine
        .process_document(
            DocumentInput::new(
                Document::new("d2", text),
                vec![occ("d2", text, "Marie Dubois", EntityType::Person)],
            ),
            &AutoReviewer,
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(outcome.plan.substitutions()[0].replacement(), Some("Madame X"));
}

#[test]
fn edited_text_does_not_replace_an_existing_alias() {
    let engine = engine();
    let text = "Marie Dubois.";
    let input = |id: &str| {
        DocumentInput::new(
            Document::new(id, text),
            vec![occ(id, text, "Marie Dubois", EntityType::Person)],
        )
    };
    engine
        .process_document(input("d1"), &AutoReviewer, &CancellationToken::new())
        .unwrap();
    let outcome = engine
        .process_document(
            input("d2"),
            &Fixed(Decision::Edited("Madame X".into())),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(outcome.plan.substitutions()[0].replacement(), Some("Madame X"));
    assert_eq!(
        engine.lookup(&person("marie dubois")).unwrap().as_deref(),
        Some("PERSON_1")
    );
}

#[test]
fn edited_text_colliding_with_another_alias_fails_the_group() {
    let engine = engine();
    let text = "Marie Dubois et Paul Martin.";
    let doc = Document::new("d1", text);
    let mut prepared = engine
        .prepare(
            doc.clone(),
            vec![
                occ("d1", text, "Marie Dubois", EntityType::Person),
                occ("d1", text, "Paul Martin", EntityType::Person),
            ],
        )
        .unwrap();
    prepared.decide(0, Decision::Confirmed).unwrap();
    prepared
        .decide(1, Decision::Edited("PERSON_1".into()))
        .unwrap();
    let outcome = engine.finalize(prepared, &CancellationToken::new()).unwrap();

    let statuses: Vec<_> = outcome
        .plan
        .substitutions()
        .iter()
        .map(|s| s.status.clone())
        .collect();
    assert_eq!(
        statuses,
        vec![
            SubstitutionStatus::Substituted {
                replacement: "PERSON_1".into()
            },
            SubstitutionStatus::Failed {
                code: "ALIAS_TAKEN".into()
            },
        ]
    );
    assert_eq!(outcome.plan.apply_to(&doc), "PERSON_1 et Paul Martin.");
}

#[test]
fn a_decision_is_recorded_once() {
    let engine = engine();
    let text = "Marie Dubois.";
    let mut prepared = engine
        .prepare(
            Document::new("d1", text),
            vec![occ("d1", text, "Marie Dubois", EntityType::Person)],
        )
        .unwrap();
    prepared.decide(0, Decision::Pending).unwrap();
    prepared.decide(0, Decision::Rejected).unwrap();
    assert!(matches!(
        prepared.decide(0, Decision::Confirmed),
        Err(ReviewError::DecisionAlreadyRecorded { .. })
    ));
    assert!(matches!(
        prepared.decide(3, Decision::Confirmed),
        Err(ReviewError::UnknownGroup { index: 3, count: 1 })
    ));
    assert!(matches!(
        prepared.disambiguate(0, &person("marie dubois")),
        Err(ReviewError::NotAmbiguous { .. })
    ));
}

#[test]
fn disambiguation_binds_to_the_chosen_candidate() {
    let engine = engine();
    let setup = "Marie Dubois et Jean Dubois.";
    engine
        .process_document(
            DocumentInput::new(
                Document::new("d1", setup),
                vec![
                    occ("d1", setup, "Marie Dubois", EntityType::Person),
                    occ("d1", setup, "Jean Dubois", EntityType::Person),
                ],
            ),
            &AutoReviewer,
            &CancellationToken::new(),
        )
        .unwrap();

    let text = "Dubois.";
    let input = DocumentInput::new(
        Document::new("d2", text),
        vec![occ("d2", text, "Dubois", EntityType::Person)],
    );
    let mut prepared = engine
        .prepare(input.document.clone(), input.occurrences.clone())
        .unwrap();
    assert!(matches!(
        prepared.disambiguate(0, &person("paul dubois")),
        Err(ReviewError::UnknownCandidate { .. })
    ));

    let outcome = engine
        .process_document(
            input,
            &PickCandidate(person("jean dubois")),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(outcome.plan.substitutions()[0].replacement(), Some("PERSON_2"));
    assert_eq!(engine.store().count().unwrap(), 2);
}

#[test]
fn confirmed_ambiguous_group_is_reported_as_ambiguous() {
    let engine = engine();
    let setup = "Marie Dubois et Jean Dubois.";
    engine
        .process_document(
            DocumentInput::new(
                Document::new("d1", setup),
                vec![
                    occ("d1", setup, "Marie Dubois", EntityType::Person),
                    occ("d1", setup, "Jean Dubois", EntityType::Person),
                ],
            ),
            &AutoReviewer,
            &CancellationToken::new(),
        )
        .unwrap();

    let text = "Dubois.";
    let outcome = engine
        .process_document(
            DocumentInput::new(
                Document::new("d2", text),
                vec![occ("d2", text, "Dubois", EntityType::Person)],
            ),
            &Fixed(Decision::Confirmed),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(
        outcome.plan.substitutions()[0].status,
        SubstitutionStatus::Ambiguous
    );
    assert_eq!(engine.store().count().unwrap(), 2);
}

#[test]
fn treat_as_new_policy_mints_a_fresh_entity() {
    let mut config = VeilConfig::default();
    config.resolution.ambiguity = Some(veil_core::config::AmbiguityPolicy::TreatAsNew);
    let engine = engine_with(config);
    let setup = "Marie Dubois et Jean Dubois.";
    engine
        .process_document(
            DocumentInput::new(
                Document::new("d1", setup),
                vec![
                    occ("d1", setup, "Marie Dubois", EntityType::Person),
                    occ("d1", setup, "Jean Dubois", EntityType::Person),
                ],
            ),
            &AutoReviewer,
            &CancellationToken::new(),
        )
        .unwrap();
    let outcome = engine
        .process_document(
            DocumentInput::new(
                Document::new("d2", "Dubois."),
                vec![RawOccurrence::new("Dubois", EntityType::Person, "d2", 0, 6, 0.9)],
            ),
            &AutoReviewer,
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(outcome.plan.substitutions()[0].replacement(), Some("PERSON_3"));
    assert_eq!(engine.store().count().unwrap(), 3);
}

#[test]
fn exhausted_alias_space_fails_only_that_type() {
    let config = VeilConfig {
        aliases: AliasConfig {
            person: Some(AliasScheme::Sequential {
                prefix: "P".into(),
                capacity: 1,
            }),
            ..Default::default()
        },
        ..Default::default()
    };
    let engine = engine_with(config);
    let text = "Marie Dubois, Paul Martin, Lyon.";
    let outcome = engine
        .process_document(
            DocumentInput::new(
                Document::new("d1", text),
                vec![
                    occ("d1", text, "Marie Dubois", EntityType::Person),
                    occ("d1", text, "Paul Martin", EntityType::Person),
                    occ("d1", text, "Lyon", EntityType::Location),
                ],
            ),
            &AutoReviewer,
            &CancellationToken::new(),
        )
        .unwrap();

    let replaced = outcome.plan.apply_to(&Document::new("d1", text));
    assert_eq!(replaced, "P1, Paul Martin, LOCATION_1.");
    assert_eq!(
        outcome.plan.substitutions()[1].status,
        SubstitutionStatus::Failed {
            code: "ALIAS_SPACE_EXHAUSTED".into()
        }
    );
    assert!(engine.assigner().is_exhausted(EntityType::Person));
}

#[test]
fn cancelled_token_stops_before_any_write() {
    let engine = engine();
    let text = "Marie Dubois.";
    let cancel = CancellationToken::new();
    veil_core::traits::Cancellable::cancel(&cancel);
    let err = engine
        .process_document(
            DocumentInput::new(
                Document::new("d1", text),
                vec![occ("d1", text, "Marie Dubois", EntityType::Person)],
            ),
            &AutoReviewer,
            &cancel,
        )
        .unwrap_err();
    assert!(matches!(err, VeilError::Cancelled));
    assert_eq!(engine.store().count().unwrap(), 0);
}
