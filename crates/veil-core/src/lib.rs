//! # veil-core
//!
//! Foundation crate for the veil pseudonymization engine.
//! Defines the data model (occurrences, canonical keys, mapping entries,
//! resolutions, decisions), the seams other crates plug into (mapping store,
//! deterministic cipher, cancellation), the error taxonomy, layered
//! configuration, and tracing setup.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::VeilConfig;
pub use errors::{VeilError, VeilResult};
pub use types::{
    CanonicalEntity, CanonicalKey, Decision, Document, EntityType, MappingEntry, RawOccurrence,
    Resolution, Span,
};
