//! Data model: occurrences, canonical identities, mapping entries,
//! resolutions, and review decisions.

pub mod canonical;
pub mod decision;
pub mod entity_type;
pub mod mapping;
pub mod occurrence;
pub mod resolution;

pub use canonical::{CanonicalEntity, CanonicalKey};
pub use decision::Decision;
pub use entity_type::EntityType;
pub use mapping::{CorruptedEntry, EntryBatch, FindOrCreate, MappingEntry};
pub use occurrence::{Document, RawOccurrence, Span};
pub use resolution::Resolution;
