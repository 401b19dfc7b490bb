//! Golden scenarios: each fixture is a sequence of documents with the
//! expected substitution output and store size after running them in order.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use veil_core::config::VeilConfig;
use veil_core::traits::CancellationToken;
use veil_engine::{AutoReviewer, DocumentInput, PseudonymEngine};
use veil_storage::InMemoryMappingStore;

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    #[allow(dead_code)]
    description: String,
    documents: Vec<DocumentInput>,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    store_entries: u64,
    documents: BTreeMap<String, ExpectedDocument>,
}

#[derive(Debug, Deserialize)]
struct ExpectedDocument {
    groups: usize,
    excluded: usize,
    dropped: usize,
    output: String,
}

fn run_scenario(relative_path: &str) {
    assert!(test_fixtures::fixture_exists(relative_path), "missing {relative_path}");
    let scenario: Scenario = test_fixtures::load_fixture(relative_path);
    let engine = PseudonymEngine::new(VeilConfig::default(), Arc::new(InMemoryMappingStore::new()));
    let cancel = CancellationToken::new();

    for input in scenario.documents {
        let document = input.document.clone();
        let outcome = engine
            .process_document(input, &AutoReviewer, &cancel)
            .unwrap_or_else(|e| panic!("{}: {} failed: {e}", scenario.name, document.id));
        let Some(expected) = scenario.expected.documents.get(&document.id) else {
            continue;
        };
        let label = format!("{} / {}", scenario.name, document.id);
        assert_eq!(outcome.groups.len(), expected.groups, "{label}: groups");
        assert_eq!(outcome.excluded, expected.excluded, "{label}: excluded");
        assert_eq!(outcome.dropped.len(), expected.dropped, "{label}: dropped");
        assert_eq!(outcome.plan.apply_to(&document), expected.output, "{label}: output");
    }

    assert_eq!(
        engine.store().count().unwrap(),
        scenario.expected.store_entries,
        "{}: store entries",
        scenario.name
    );
}

#[test]
fn all_golden_scenarios() {
    let scenarios = test_fixtures::list_fixtures("scenarios");
    assert!(scenarios.len() >= 4, "expected golden scenarios, found {}", scenarios.len());
    for path in scenarios {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        run_scenario(&format!("scenarios/{name}"));
    }
}

#[test]
fn dropped_occurrences_carry_their_code() {
    let scenario: Scenario = test_fixtures::load_fixture("scenarios/04_invalid_occurrences.json");
    let engine = PseudonymEngine::new(VeilConfig::default(), Arc::new(InMemoryMappingStore::new()));
    let input = scenario.documents.into_iter().next().unwrap();
    let outcome = engine
        .process_document(input, &AutoReviewer, &CancellationToken::new())
        .unwrap();

    let codes: Vec<&str> = outcome.dropped.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["INVALID_ENTITY_TEXT", "INVALID_SPAN", "INVALID_SPAN"]);
}

#[test]
fn outcome_serializes_for_review_tooling() {
    let scenario: Scenario = test_fixtures::load_fixture("scenarios/03_exclusion.json");
    let engine = PseudonymEngine::new(VeilConfig::default(), Arc::new(InMemoryMappingStore::new()));
    let input = scenario.documents.into_iter().next().unwrap();
    let outcome = engine
        .process_document(input, &AutoReviewer, &CancellationToken::new())
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    let substitution = &json["plan"]["substitutions"][0];
    assert_eq!(substitution["status"], "substituted");
    assert_eq!(substitution["replacement"], "PERSON_1");
    assert_eq!(json["excluded"], 1);
}
