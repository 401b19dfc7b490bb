//! Seams other crates plug into.

pub mod cancellation;
pub mod cipher;
pub mod mapping_store;

pub use cancellation::{Cancellable, CancellationToken};
pub use cipher::DeterministicCipher;
pub use mapping_store::{AliasLedger, MappingStore};
