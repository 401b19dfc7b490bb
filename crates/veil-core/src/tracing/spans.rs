//! Span definitions per operation: document, batch, find_or_create.
//!
//! Occurrence text never goes into a span field; only ids, counts, and
//! entity types do.

/// Create a span for processing one document.
#[macro_export]
macro_rules! document_span {
    ($document_id:expr, $occurrences:expr) => {
        tracing::info_span!(
            "veil.document",
            document_id = %$document_id,
            occurrences = $occurrences
        )
    };
}

/// Create a span for a batch run.
#[macro_export]
macro_rules! batch_span {
    ($documents:expr, $threads:expr) => {
        tracing::info_span!("veil.batch", documents = $documents, threads = $threads)
    };
}

/// Create a span for one atomic find-or-create against the mapping store.
#[macro_export]
macro_rules! find_or_create_span {
    ($entity_type:expr) => {
        tracing::debug_span!("veil.find_or_create", entity_type = %$entity_type)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const DOCUMENT: &str = "veil.document";
    pub const BATCH: &str = "veil.batch";
    pub const FIND_OR_CREATE: &str = "veil.find_or_create";
}
