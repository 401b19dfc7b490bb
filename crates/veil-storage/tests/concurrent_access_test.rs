//! Concurrent find_or_create: threads sharing one store, and independent
//! store instances (as separate processes would) sharing one file.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use veil_core::config::StorageConfig;
use veil_core::traits::MappingStore;
use veil_core::types::{CanonicalKey, EntityType};
use veil_privacy::SivCipher;
use veil_storage::{RetryPolicy, SqliteMappingStore};

const THREADS: usize = 8;
const KEYS: usize = 20;

fn keys() -> Vec<CanonicalKey> {
    (0..KEYS)
        .map(|i| CanonicalKey::new(EntityType::Person, format!("person {i}")))
        .collect()
}

/// Every thread walks the keys in its own rotation so contention is spread.
fn hammer(store: &dyn MappingStore, thread: usize, assigned: &AtomicUsize) -> Vec<String> {
    let keys = keys();
    let mut aliases = vec![String::new(); KEYS];
    for step in 0..KEYS {
        let i = (step + thread * 3) % KEYS;
        let outcome = store
            .find_or_create(&keys[i], &mut |ledger| {
                assigned.fetch_add(1, Ordering::SeqCst);
                Ok(format!(
                    "PERSON_{}",
                    ledger.assigned_count(EntityType::Person)? + 1
                ))
            })
            .unwrap();
        aliases[i] = outcome.alias;
    }
    aliases
}

fn assert_converged(results: &[Vec<String>]) {
    for r in &results[1..] {
        assert_eq!(r, &results[0], "all workers must see the same aliases");
    }
    let mut unique = results[0].clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), KEYS, "aliases must be distinct");
}

#[test]
fn threads_sharing_one_store_converge() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shared.db");
    let store = Arc::new(
        SqliteMappingStore::open(
            &db_path,
            Arc::new(SivCipher::new([5u8; 32])),
            &StorageConfig::default(),
        )
        .unwrap(),
    );
    let assigned = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            let assigned = Arc::clone(&assigned);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                hammer(store.as_ref(), t, &assigned)
            })
        })
        .collect();
    let results: Vec<Vec<String>> = handles
        .into_iter()
        .map(|h| h.join().expect("worker should not panic"))
        .collect();

    assert_converged(&results);
    assert_eq!(assigned.load(Ordering::SeqCst), KEYS);
    assert_eq!(store.count().unwrap(), KEYS as u64);
}

#[test]
fn independent_instances_on_one_file_converge() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("multi.db");
    let key = [6u8; 32];
    // Create the file up front so the instances race on entries only.
    drop(
        SqliteMappingStore::open(&db_path, Arc::new(SivCipher::new(key)), &StorageConfig::default())
            .unwrap(),
    );

    let assigned = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let db_path = db_path.clone();
            let assigned = Arc::clone(&assigned);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                // Eight connections contend for one write lock.
                let store = SqliteMappingStore::open(
                    &db_path,
                    Arc::new(SivCipher::new(key)),
                    &StorageConfig::default(),
                )
                .unwrap()
                .with_retry_policy(RetryPolicy {
                    max_attempts: 50,
                    initial_backoff: Duration::from_millis(1),
                    max_backoff: Duration::from_millis(50),
                });
                barrier.wait();
                hammer(&store, t, &assigned)
            })
        })
        .collect();
    let results: Vec<Vec<String>> = handles
        .into_iter()
        .map(|h| h.join().expect("worker should not panic"))
        .collect();

    assert_converged(&results);
    assert_eq!(assigned.load(Ordering::SeqCst), KEYS);

    let config = StorageConfig {
        db_path: Some(db_path.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let store = SqliteMappingStore::open_from_config(&config, Arc::new(SivCipher::new(key))).unwrap();
    assert_eq!(store.path(), Some(db_path.as_path()));
    assert_eq!(store.count().unwrap(), KEYS as u64);
    assert_eq!(store.entries_since(0).unwrap().entries.len(), KEYS);
}
