//! Mapping store contract, run against both the SQLite and in-memory stores.

use std::sync::Arc;

use veil_core::errors::{AliasError, VeilError, VeilResult};
use veil_core::traits::{AliasLedger, MappingStore};
use veil_core::types::{CanonicalKey, EntityType};
use veil_privacy::SivCipher;
use veil_storage::{InMemoryMappingStore, SqliteMappingStore};

fn sqlite() -> SqliteMappingStore {
    SqliteMappingStore::open_in_memory(Arc::new(SivCipher::new([3u8; 32]))).unwrap()
}

fn person(name: &str) -> CanonicalKey {
    CanonicalKey::new(EntityType::Person, name)
}

fn sequential(ledger: &dyn AliasLedger, entity_type: EntityType) -> VeilResult<String> {
    Ok(format!("{}_{}", entity_type, ledger.assigned_count(entity_type)? + 1))
}

fn create(store: &dyn MappingStore, key: &CanonicalKey) -> (String, bool) {
    let entity_type = key.entity_type;
    let outcome = store
        .find_or_create(key, &mut |ledger| sequential(ledger, entity_type))
        .unwrap();
    (outcome.alias, outcome.created)
}

fn each_store(check: impl Fn(&dyn MappingStore)) {
    check(&sqlite());
    check(&InMemoryMappingStore::new());
}

#[test]
fn find_or_create_is_idempotent() {
    each_store(|store| {
        let key = person("marie dubois");
        assert_eq!(create(store, &key), ("PERSON_1".to_string(), true));
        assert_eq!(create(store, &key), ("PERSON_1".to_string(), false));
        assert_eq!(store.count().unwrap(), 1);
    });
}

#[test]
fn assign_runs_only_for_missing_keys() {
    each_store(|store| {
        let key = person("marie dubois");
        let mut calls = 0;
        for _ in 0..5 {
            store
                .find_or_create(&key, &mut |_| {
                    calls += 1;
                    Ok("PERSON_1".to_string())
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
    });
}

#[test]
fn lookup_never_allocates() {
    each_store(|store| {
        let key = person("jean dubois");
        assert_eq!(store.lookup(&key).unwrap(), None);
        assert_eq!(store.count().unwrap(), 0);
        create(store, &key);
        assert_eq!(store.lookup(&key).unwrap().as_deref(), Some("PERSON_1"));
    });
}

#[test]
fn aliases_are_scoped_per_type() {
    each_store(|store| {
        let paris_person = person("paris");
        let paris_place = CanonicalKey::new(EntityType::Location, "paris");
        store
            .find_or_create(&paris_person, &mut |_| Ok("X".to_string()))
            .unwrap();
        let outcome = store
            .find_or_create(&paris_place, &mut |_| Ok("X".to_string()))
            .unwrap();
        assert!(outcome.created, "same alias text is allowed for another type");

        let counts = store.count_by_type().unwrap();
        assert_eq!(
            counts,
            vec![
                (EntityType::Person, 1),
                (EntityType::Location, 1),
                (EntityType::Org, 0)
            ]
        );
    });
}

#[test]
fn duplicate_alias_is_rejected_and_nothing_written() {
    each_store(|store| {
        store
            .find_or_create(&person("marie dubois"), &mut |_| Ok("Alice".to_string()))
            .unwrap();
        let err = store
            .find_or_create(&person("jean dubois"), &mut |_| Ok("Alice".to_string()))
            .unwrap_err();
        assert!(matches!(err, VeilError::Alias(AliasError::AliasTaken { .. })));
        assert_eq!(store.lookup(&person("jean dubois")).unwrap(), None);
        assert_eq!(store.count().unwrap(), 1);
    });
}

#[test]
fn empty_alias_is_rejected() {
    each_store(|store| {
        let err = store
            .find_or_create(&person("marie dubois"), &mut |_| Ok("   ".to_string()))
            .unwrap_err();
        assert!(matches!(err, VeilError::Alias(AliasError::EmptyAlias { .. })));
        assert_eq!(store.count().unwrap(), 0);
    });
}

#[test]
fn assign_errors_propagate_without_writing() {
    each_store(|store| {
        let err = store
            .find_or_create(&person("marie dubois"), &mut |_| {
                Err(AliasError::AliasSpaceExhausted {
                    entity_type: EntityType::Person,
                    capacity: 0,
                }
                .into())
            })
            .unwrap_err();
        assert!(matches!(
            err,
            VeilError::Alias(AliasError::AliasSpaceExhausted { .. })
        ));
        assert_eq!(store.count().unwrap(), 0);
    });
}

#[test]
fn ledger_sees_existing_aliases() {
    each_store(|store| {
        create(store, &person("marie dubois"));
        store
            .find_or_create(&person("jean dubois"), &mut |ledger| {
                assert_eq!(ledger.assigned_count(EntityType::Person)?, 1);
                assert!(ledger.is_alias_taken(EntityType::Person, "PERSON_1")?);
                assert!(!ledger.is_alias_taken(EntityType::Location, "PERSON_1")?);
                Ok("PERSON_2".to_string())
            })
            .unwrap();
    });
}

#[test]
fn entries_since_is_incremental() {
    each_store(|store| {
        create(store, &person("marie dubois"));
        create(store, &person("jean dubois"));

        let first = store.entries_since(0).unwrap();
        assert_eq!(first.entries.len(), 2);
        assert!(first.corrupted.is_empty());
        assert_eq!(first.entries[0].key, person("marie dubois"));
        assert_eq!(first.entries[1].alias, "PERSON_2");
        assert!(first.entries[0].seq < first.entries[1].seq);

        create(store, &CanonicalKey::new(EntityType::Org, "acme"));
        let next = store.entries_since(first.high_water).unwrap();
        assert_eq!(next.entries.len(), 1);
        assert_eq!(next.entries[0].alias, "ORG_1");

        let empty = store.entries_since(next.high_water).unwrap();
        assert!(empty.entries.is_empty());
        assert_eq!(empty.high_water, next.high_water);
    });
}
