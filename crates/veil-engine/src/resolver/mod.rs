//! Compositional resolution: exact repeats, bound components (a bare
//! surname of one known full name), fresh entities, and ambiguity.

pub mod known;

use veil_core::config::AmbiguityPolicy;
use veil_core::types::{CanonicalKey, EntityType, Resolution};

pub use known::{fullness, EntityIndex, KnownEntities, Layered, SyncStats};

/// Classify a normalized occurrence against the known entities.
///
/// Only entities of the same type are considered. An exact key match wins
/// over component matching. Ambiguity is reported, never guessed.
pub fn resolve(
    normalized_text: &str,
    entity_type: EntityType,
    tokens: &[String],
    known: &dyn EntityIndex,
) -> Resolution {
    let key = CanonicalKey::new(entity_type, normalized_text);
    if known.contains(&key) {
        return Resolution::ExactMatch(key);
    }

    let mut candidates = known.supersets_of(entity_type, tokens).into_iter();
    match (candidates.next(), candidates.next()) {
        (None, _) => Resolution::New,
        (Some(only), None) => Resolution::ComponentOf(only),
        (Some(first), Some(second)) => {
            let mut all = vec![first, second];
            all.extend(candidates);
            Resolution::Ambiguous(all)
        }
    }
}

/// [`resolve`] plus the configured ambiguity policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    policy: AmbiguityPolicy,
}

impl Resolver {
    pub fn new(policy: AmbiguityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }

    pub fn resolve(
        &self,
        normalized_text: &str,
        entity_type: EntityType,
        tokens: &[String],
        known: &dyn EntityIndex,
    ) -> Resolution {
        match resolve(normalized_text, entity_type, tokens, known) {
            Resolution::Ambiguous(_) if self.policy == AmbiguityPolicy::TreatAsNew => {
                Resolution::New
            }
            other => other,
        }
    }
}
