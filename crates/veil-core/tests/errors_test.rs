//! Tests for the veil error taxonomy.

use std::collections::HashSet;

use veil_core::errors::error_code::{self, VeilErrorCode};
use veil_core::errors::*;
use veil_core::types::EntityType;

#[test]
fn every_error_has_a_code() {
    let errors: Vec<VeilError> = vec![
        NormalizeError::InvalidEntityText { text: "M.".into() }.into(),
        NormalizeError::InvalidSpan { start: 4, end: 2, len: 10 }.into(),
        AliasError::AliasSpaceExhausted {
            entity_type: EntityType::Person,
            capacity: 3,
        }
        .into(),
        StorageError::Unavailable { message: "gone".into() }.into(),
        StorageError::WriteConflict { attempts: 5, message: "locked".into() }.into(),
        StorageError::Corruption { seq: 7, details: "tag".into() }.into(),
        CipherError::Open { message: "tag".into() }.into(),
        ConfigError::FileNotFound { path: "/tmp".into() }.into(),
        ReviewError::UnknownGroup { index: 3, count: 1 }.into(),
        VeilError::Cancelled,
    ];
    for err in &errors {
        assert!(!err.error_code().is_empty());
        assert!(err.coded_string().starts_with('['));
    }
}

#[test]
fn storage_codes_are_distinct() {
    let codes: HashSet<&str> = [
        StorageError::Unavailable { message: String::new() }.error_code(),
        StorageError::Busy { message: String::new() }.error_code(),
        StorageError::WriteConflict { attempts: 1, message: String::new() }.error_code(),
        StorageError::Corruption { seq: 1, details: String::new() }.error_code(),
        StorageError::KeyMismatch.error_code(),
        StorageError::SqliteError { message: String::new() }.error_code(),
        StorageError::MigrationFailed { version: 1, message: String::new() }.error_code(),
    ]
    .into_iter()
    .collect();
    assert_eq!(codes.len(), 7);
}

#[test]
fn from_conversions_keep_the_subsystem_error() {
    let err: VeilError = StorageError::KeyMismatch.into();
    assert!(matches!(err, VeilError::Storage(StorageError::KeyMismatch)));
    assert_eq!(err.error_code(), error_code::STORE_KEY_MISMATCH);

    let err: VeilError = AliasError::EmptyAlias { entity_type: EntityType::Org }.into();
    assert_eq!(err.error_code(), error_code::EMPTY_ALIAS);
}

#[test]
fn fatality_follows_the_propagation_policy() {
    // Scoped to one occurrence, type, or key.
    let scoped: Vec<VeilError> = vec![
        NormalizeError::InvalidEntityText { text: String::new() }.into(),
        AliasError::AliasSpaceExhausted {
            entity_type: EntityType::Location,
            capacity: 1,
        }
        .into(),
        StorageError::Corruption { seq: 2, details: String::new() }.into(),
        ReviewError::NotAmbiguous { group: "g".into() }.into(),
    ];
    for err in &scoped {
        assert!(!err.is_fatal(), "{err} should not be fatal");
    }

    // Abort the batch.
    let fatal: Vec<VeilError> = vec![
        StorageError::Unavailable { message: String::new() }.into(),
        StorageError::WriteConflict { attempts: 5, message: String::new() }.into(),
        StorageError::KeyMismatch.into(),
        CipherError::InvalidKey { reason: "short".into() }.into(),
        VeilError::Cancelled,
    ];
    for err in &fatal {
        assert!(err.is_fatal(), "{err} should be fatal");
    }
}

#[test]
fn only_busy_is_transient() {
    let busy: VeilError = StorageError::Busy { message: "locked".into() }.into();
    assert!(busy.is_transient());
    let conflict: VeilError = StorageError::WriteConflict { attempts: 3, message: String::new() }.into();
    assert!(!conflict.is_transient());
}

#[test]
fn messages_never_hide_the_cause() {
    let err: VeilError = StorageError::WriteConflict {
        attempts: 5,
        message: "database is locked".into(),
    }
    .into();
    let msg = err.to_string();
    assert!(msg.contains("5 attempts"));
    assert!(msg.contains("database is locked"));
}
