//! Exclusion zones: built-in shapes, configured patterns, degradation.

use veil_core::config::{ExclusionConfig, ExclusionPattern};
use veil_core::errors::ConfigError;
use veil_core::types::{Document, Span};
use veil_privacy::ExclusionFilter;

fn char_span(doc: &Document, needle: &str) -> Span {
    let byte = doc.text.find(needle).unwrap();
    let start = doc.text[..byte].chars().count();
    Span::new(start, start + needle.chars().count())
}

#[test]
fn name_inside_an_email_is_excluded() {
    let filter = ExclusionFilter::default();
    let doc = Document::new("d1", "Écrire à marie.dubois@example.fr pour Marie Dubois.");
    let in_email = char_span(&doc, "marie.dubois");
    assert!(filter.is_excluded("marie.dubois", in_email, &doc));

    let byte = doc.text.rfind("Marie Dubois").unwrap();
    let start = doc.text[..byte].chars().count();
    let outside = Span::new(start, start + 12);
    assert!(!filter.is_excluded("Marie Dubois", outside, &doc));
}

#[test]
fn email_shaped_detector_text_is_excluded_regardless_of_span() {
    let filter = ExclusionFilter::default();
    let doc = Document::new("d1", "no zone here");
    assert!(filter.is_excluded("jean@corp.fr", Span::new(0, 2), &doc));
}

#[test]
fn urls_and_handles_are_zones() {
    let filter = ExclusionFilter::default();
    let doc = Document::new(
        "d2",
        "Voir https://exemple.fr/equipe/Lefevre et suivre @hlefevre sur le réseau.",
    );
    let zones = filter.zones(&doc);
    let names: Vec<&str> = zones.zones().iter().map(|z| z.pattern_name.as_str()).collect();
    assert!(names.contains(&"url"));
    assert!(names.contains(&"handle"));
    assert!(filter.is_excluded("Lefevre", char_span(&doc, "Lefevre"), &doc));
    assert!(filter.is_excluded("hlefevre", char_span(&doc, "hlefevre"), &doc));
}

#[test]
fn email_domain_is_not_a_handle() {
    let filter = ExclusionFilter::default();
    let doc = Document::new("d3", "a@bcd.fr");
    let zones = filter.zones(&doc);
    assert!(zones.zones().iter().all(|z| z.pattern_name != "handle"));
}

#[test]
fn configured_patterns_add_zones() {
    let config = ExclusionConfig {
        builtin: Some(false),
        patterns: vec![ExclusionPattern {
            name: "case_number".into(),
            regex: r"RG \d+/\d+ [A-Z][a-z]+".into(),
        }],
    };
    let filter = ExclusionFilter::from_config(&config);
    let doc = Document::new("d4", "Dossier RG 21/0042 Martin, voir a@b.fr");
    assert!(filter.is_excluded("Martin", char_span(&doc, "Martin"), &doc));
    // builtins disabled
    assert!(!filter.is_excluded("a", char_span(&doc, "a@"), &doc));
}

#[test]
fn broken_patterns_degrade_gracefully() {
    let config = ExclusionConfig {
        builtin: None,
        patterns: vec![ExclusionPattern {
            name: "broken".into(),
            regex: "([unclosed".into(),
        }],
    };
    let filter = ExclusionFilter::from_config(&config);
    assert_eq!(filter.degradation().failure_count(), 1);
    assert_eq!(filter.degradation().failures()[0].pattern_name, "broken");
    assert!(filter.pattern_names().any(|n| n == "email"));

    match ExclusionFilter::try_from_config(&config) {
        Err(ConfigError::InvalidPattern { name, .. }) => assert_eq!(name, "broken"),
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}
