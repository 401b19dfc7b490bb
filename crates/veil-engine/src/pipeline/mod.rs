//! Document and batch processing.

pub mod batch;
pub mod document;
pub mod report;

pub use batch::{BatchRunner, BATCH_ID};
pub use document::{DocumentInput, DocumentWorker, PreparedDocument};
pub use report::{BatchReport, DocumentFailure, DocumentOutcome, DroppedOccurrence, GroupSummary};
