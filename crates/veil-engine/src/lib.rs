//! # veil-engine
//!
//! Turns detector output into substitution plans: exclusion, normalization,
//! compositional resolution against known entities, one group and one review
//! decision per canonical entity, alias assignment inside the mapping
//! store's atomic find-or-create, and parallel batch runs.

pub mod alias;
pub mod dedup;
pub mod engine;
pub mod pipeline;
pub mod resolver;

pub use alias::{AliasAssigner, AliasGenerator};
pub use dedup::{
    AutoReviewer, Deduplicator, OccurrenceGroup, Reviewer, Substitution, SubstitutionPlan,
    SubstitutionStatus,
};
pub use engine::PseudonymEngine;
pub use pipeline::{BatchReport, BatchRunner, DocumentInput, DocumentOutcome, PreparedDocument};
pub use resolver::{resolve, KnownEntities, Resolver};
