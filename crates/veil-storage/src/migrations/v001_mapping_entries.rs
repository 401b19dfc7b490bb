//! V001: mapping_entries and store_meta.

pub const MIGRATION_SQL: &str = r#"
-- One row per canonical entity. Both the canonical key and the alias are
-- sealed with the deterministic cipher; equal plaintexts give equal blobs,
-- so the UNIQUE constraints hold on the plaintext values too.
CREATE TABLE IF NOT EXISTS mapping_entries (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    key_ciphertext BLOB NOT NULL UNIQUE,
    entity_type TEXT NOT NULL CHECK (entity_type IN ('PERSON', 'LOCATION', 'ORG')),
    alias_ciphertext BLOB NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (entity_type, alias_ciphertext)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_mapping_entries_type
    ON mapping_entries(entity_type);

-- Entries are append-only.
CREATE TRIGGER IF NOT EXISTS mapping_entries_no_update
    BEFORE UPDATE ON mapping_entries
BEGIN
    SELECT RAISE(ABORT, 'mapping entries are append-only');
END;

CREATE TRIGGER IF NOT EXISTS mapping_entries_no_delete
    BEFORE DELETE ON mapping_entries
BEGIN
    SELECT RAISE(ABORT, 'mapping entries are append-only');
END;

-- Store-level metadata (sealed key check value).
CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL
) STRICT;
"#;
