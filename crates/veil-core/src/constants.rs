//! Constants shared across the workspace.

/// Workspace version string.
pub const VEIL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Separator between entity type and normalized text in the storage form of a
/// canonical key (ASCII unit separator, never produced by the normalizer).
pub const KEY_SEPARATOR: char = '\u{1f}';

/// Plaintext sealed into `store_meta` to detect a store opened with the wrong key.
pub const KEY_CHECK_PLAINTEXT: &[u8] = b"veil:mapping-store:key-check:v1";

/// Current mapping store schema version (`PRAGMA user_version`).
pub const SCHEMA_VERSION: u32 = 1;
