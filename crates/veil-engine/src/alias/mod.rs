//! Alias assignment. Called only from inside the mapping store's
//! find-or-create critical section, through the [`AliasLedger`] it exposes.

pub mod name_pool;
pub mod sequential;

use std::sync::atomic::{AtomicBool, Ordering};

use veil_core::config::{AliasConfig, AliasScheme};
use veil_core::errors::{AliasError, VeilError, VeilResult};
use veil_core::traits::AliasLedger;
use veil_core::types::{CanonicalEntity, EntityType};

pub use name_pool::NamePoolAliases;
pub use sequential::SequentialAliases;

/// One naming scheme for one entity type.
pub trait AliasGenerator: Send + Sync {
    /// A fresh alias, distinct from every alias the ledger already holds
    /// for the type, or `AliasSpaceExhausted`.
    fn generate(&self, entity: &CanonicalEntity, ledger: &dyn AliasLedger) -> VeilResult<String>;

    fn capacity(&self) -> u64;
}

fn generator_for(entity_type: EntityType, scheme: AliasScheme) -> Box<dyn AliasGenerator> {
    match scheme {
        AliasScheme::Sequential { prefix, capacity } => {
            Box::new(SequentialAliases::new(entity_type, prefix, capacity))
        }
        AliasScheme::NamePool { names } => Box::new(NamePoolAliases::new(entity_type, names)),
    }
}

fn slot(entity_type: EntityType) -> usize {
    match entity_type {
        EntityType::Person => 0,
        EntityType::Location => 1,
        EntityType::Org => 2,
    }
}

/// Per-type alias generators.
///
/// Aliases are never released, so exhaustion is permanent: once a type runs
/// out, later calls for it fail without probing the ledger again.
pub struct AliasAssigner {
    generators: [Box<dyn AliasGenerator>; 3],
    exhausted: [AtomicBool; 3],
}

impl AliasAssigner {
    pub fn from_config(config: &AliasConfig) -> Self {
        Self {
            generators: EntityType::ALL.map(|t| generator_for(t, config.effective_scheme(t))),
            exhausted: Default::default(),
        }
    }

    /// Replace the generator for one type.
    pub fn with_generator(mut self, entity_type: EntityType, generator: Box<dyn AliasGenerator>) -> Self {
        self.generators[slot(entity_type)] = generator;
        self.exhausted[slot(entity_type)].store(false, Ordering::Release);
        self
    }

    pub fn capacity(&self, entity_type: EntityType) -> u64 {
        self.generators[slot(entity_type)].capacity()
    }

    pub fn is_exhausted(&self, entity_type: EntityType) -> bool {
        self.exhausted[slot(entity_type)].load(Ordering::Acquire)
    }

    /// Generate the alias for a canonical entity seen for the first time.
    pub fn assign(&self, entity: &CanonicalEntity, ledger: &dyn AliasLedger) -> VeilResult<String> {
        let entity_type = entity.entity_type();
        let i = slot(entity_type);
        if self.exhausted[i].load(Ordering::Acquire) {
            return Err(AliasError::AliasSpaceExhausted {
                entity_type,
                capacity: self.generators[i].capacity(),
            }
            .into());
        }

        match self.generators[i].generate(entity, ledger) {
            Err(VeilError::Alias(AliasError::AliasSpaceExhausted { capacity, .. })) => {
                if !self.exhausted[i].swap(true, Ordering::AcqRel) {
                    tracing::error!(entity_type = %entity_type, capacity, "alias space exhausted");
                }
                Err(AliasError::AliasSpaceExhausted {
                    entity_type,
                    capacity,
                }
                .into())
            }
            other => other,
        }
    }
}

impl Default for AliasAssigner {
    fn default() -> Self {
        Self::from_config(&AliasConfig::default())
    }
}

impl std::fmt::Debug for AliasAssigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasAssigner")
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use veil_core::types::CanonicalKey;

    #[derive(Default)]
    struct Ledger {
        taken: HashSet<(EntityType, String)>,
    }

    impl AliasLedger for Ledger {
        fn assigned_count(&self, entity_type: EntityType) -> VeilResult<u64> {
            Ok(self.taken.iter().filter(|(t, _)| *t == entity_type).count() as u64)
        }

        fn is_alias_taken(&self, entity_type: EntityType, alias: &str) -> VeilResult<bool> {
            Ok(self.taken.contains(&(entity_type, alias.to_string())))
        }
    }

    fn entity(t: EntityType, name: &str) -> CanonicalEntity {
        CanonicalEntity::from_store(CanonicalKey::new(t, name))
    }

    #[test]
    fn sequential_skips_edited_aliases() {
        let assigner = AliasAssigner::default();
        let mut ledger = Ledger::default();
        ledger.taken.insert((EntityType::Person, "PERSON_2".into()));
        ledger.taken.insert((EntityType::Person, "Jeanne".into()));
        // Two taken: starts at 3.
        let alias = assigner.assign(&entity(EntityType::Person, "a"), &ledger).unwrap();
        assert_eq!(alias, "PERSON_3");

        ledger.taken.insert((EntityType::Person, alias));
        // Three taken: PERSON_4 is next.
        let alias = assigner.assign(&entity(EntityType::Person, "b"), &ledger).unwrap();
        assert_eq!(alias, "PERSON_4");
    }

    #[test]
    fn exhaustion_sticks_per_type() {
        let config = AliasConfig {
            org: Some(AliasScheme::Sequential {
                prefix: "ORG-".into(),
                capacity: 1,
            }),
            ..Default::default()
        };
        let assigner = AliasAssigner::from_config(&config);
        let mut ledger = Ledger::default();
        assert_eq!(
            assigner.assign(&entity(EntityType::Org, "acme"), &ledger).unwrap(),
            "ORG-1"
        );
        ledger.taken.insert((EntityType::Org, "ORG-1".into()));

        let err = assigner
            .assign(&entity(EntityType::Org, "globex"), &ledger)
            .unwrap_err();
        assert!(matches!(
            err,
            VeilError::Alias(AliasError::AliasSpaceExhausted { capacity: 1, .. })
        ));
        assert!(assigner.is_exhausted(EntityType::Org));
        assert!(!assigner.is_exhausted(EntityType::Person));
        assert!(assigner.assign(&entity(EntityType::Person, "x"), &ledger).is_ok());
    }

    #[test]
    fn name_pool_is_keyed_and_skips_taken_names() {
        let names: Vec<String> = ["Alix", "Camille", "Dominique"].map(String::from).to_vec();
        let pool = NamePoolAliases::new(EntityType::Person, names.clone());
        let mut ledger = Ledger::default();
        let marie = entity(EntityType::Person, "marie dubois");

        let first = pool.generate(&marie, &ledger).unwrap();
        assert_eq!(first, pool.generate(&marie, &ledger).unwrap());

        ledger.taken.insert((EntityType::Person, first.clone()));
        let second = pool.generate(&marie, &ledger).unwrap();
        assert_ne!(first, second);
        assert!(names.contains(&second));

        for n in &names {
            ledger.taken.insert((EntityType::Person, n.clone()));
        }
        assert!(pool.generate(&marie, &ledger).is_err());
    }
}
