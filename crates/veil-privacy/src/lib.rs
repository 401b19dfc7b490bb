//! # veil-privacy
//!
//! Text-level building blocks of the pseudonymization pipeline:
//! honorific stripping and diacritic folding, structural exclusion zones
//! (emails, URLs, handles), and the deterministic SIV cipher the mapping
//! store seals keys and aliases with.

pub mod cipher;
pub mod degradation;
pub mod exclusion;
pub mod normalizer;

pub use cipher::SivCipher;
pub use degradation::DegradationTracker;
pub use exclusion::{ExclusionFilter, ExclusionZones};
pub use normalizer::{NormalizedText, Normalizer};
