//! Parallel batch runs: one worker per document on a rayon pool.

use rayon::prelude::*;

use veil_core::config::BatchConfig;
use veil_core::errors::{ConfigError, VeilError, VeilErrorCode, VeilResult};
use veil_core::traits::{Cancellable, CancellationToken};

use crate::dedup::Reviewer;
use crate::engine::PseudonymEngine;

use super::document::DocumentInput;
use super::report::{BatchReport, DocumentFailure, DocumentOutcome};

/// Failure id for errors that belong to the batch, not one document.
pub const BATCH_ID: &str = "batch";

enum DocumentResult {
    Done(DocumentOutcome),
    Failed(DocumentFailure),
    Fatal(DocumentFailure),
    Skipped(String),
}

/// Owns the worker pool for batch runs.
pub struct BatchRunner {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl BatchRunner {
    pub fn new(threads: usize) -> VeilResult<Self> {
        let threads = threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("veil-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "batch.threads".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { pool, threads })
    }

    pub fn from_config(config: &BatchConfig) -> VeilResult<Self> {
        Self::new(config.effective_threads())
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Process every document in parallel.
    ///
    /// Every document resolves against the entities the whole batch
    /// introduces, so which full name a bare component binds to does not
    /// depend on the order documents finish in.
    ///
    /// A document's own errors land in `failures` and the batch carries on.
    /// A fatal error (store unavailable, exhausted write retries, key
    /// mismatch) cancels the token: documents not yet started are skipped,
    /// and the error is reported as `fatal`.
    pub fn run(
        &self,
        engine: &PseudonymEngine,
        inputs: Vec<DocumentInput>,
        reviewer: &dyn Reviewer,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let _span = veil_core::batch_span!(inputs.len(), self.threads).entered();

        let scope = match engine.batch_scope(&inputs) {
            Ok(scope) => scope,
            Err(e) => {
                tracing::error!(
                    code = e.error_code(),
                    error = %e,
                    "cannot scope batch, aborting"
                );
                cancel.cancel();
                return BatchReport {
                    fatal: Some(DocumentFailure::new(BATCH_ID, &e)),
                    skipped: inputs.into_iter().map(|input| input.document.id).collect(),
                    ..Default::default()
                };
            }
        };

        let results: Vec<DocumentResult> = self.pool.install(|| {
            inputs
                .into_par_iter()
                .map(|input| {
                    let document_id = input.document.id.clone();
                    if cancel.is_cancelled() {
                        return DocumentResult::Skipped(document_id);
                    }
                    match engine.process_in_batch(input, &scope, reviewer, cancel) {
                        Ok(outcome) => DocumentResult::Done(outcome),
                        Err(VeilError::Cancelled) => DocumentResult::Skipped(document_id),
                        Err(e) if e.is_fatal() => {
                            tracing::error!(
                                document_id = %document_id,
                                code = e.error_code(),
                                error = %e,
                                "fatal error, aborting batch"
                            );
                            cancel.cancel();
                            DocumentResult::Fatal(DocumentFailure::new(document_id, &e))
                        }
                        Err(e) => {
                            tracing::warn!(
                                document_id = %document_id,
                                code = e.error_code(),
                                error = %e,
                                "document failed"
                            );
                            DocumentResult::Failed(DocumentFailure::new(document_id, &e))
                        }
                    }
                })
                .collect()
        });

        let mut report = BatchReport::default();
        for result in results {
            match result {
                DocumentResult::Done(outcome) => report.documents.push(outcome),
                DocumentResult::Failed(failure) => report.failures.push(failure),
                DocumentResult::Fatal(failure) if report.fatal.is_none() => {
                    report.fatal = Some(failure)
                }
                DocumentResult::Fatal(failure) => report.failures.push(failure),
                DocumentResult::Skipped(id) => report.skipped.push(id),
            }
        }

        tracing::info!(
            documents = report.documents.len(),
            failures = report.failures.len(),
            skipped = report.skipped.len(),
            entries_created = report.entries_created(),
            aborted = report.is_aborted(),
            "batch finished"
        );
        report
    }
}

impl std::fmt::Debug for BatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRunner")
            .field("threads", &self.threads)
            .finish_non_exhaustive()
    }
}
