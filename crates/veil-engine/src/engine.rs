//! PseudonymEngine: the pipeline wired together around an injected store.

use std::sync::{Arc, RwLock};

use veil_core::config::VeilConfig;
use veil_core::errors::{StorageError, VeilResult};
use veil_core::traits::{Cancellable, CancellationToken, DeterministicCipher, MappingStore};
use veil_core::types::{CanonicalKey, Document, RawOccurrence};
use veil_privacy::{ExclusionFilter, Normalizer};
use veil_storage::SqliteMappingStore;

use crate::alias::AliasAssigner;
use crate::dedup::{Deduplicator, Reviewer};
use crate::pipeline::{
    BatchReport, BatchRunner, DocumentInput, DocumentOutcome, DocumentWorker, PreparedDocument,
};
use crate::resolver::{KnownEntities, Resolver, SyncStats};

/// Normalizer, exclusion filter, resolver, alias assigner and
/// deduplicator over one mapping store.
///
/// Shareable across threads; every document gets its own worker view.
pub struct PseudonymEngine {
    normalizer: Normalizer,
    exclusion: ExclusionFilter,
    resolver: Resolver,
    assigner: Arc<AliasAssigner>,
    store: Arc<dyn MappingStore>,
    known: RwLock<KnownEntities>,
    dedup: Deduplicator,
    config: VeilConfig,
}

impl PseudonymEngine {
    pub fn new(config: VeilConfig, store: Arc<dyn MappingStore>) -> Self {
        let exclusion = ExclusionFilter::from_config(&config.exclusion);
        Self::with_exclusion(config, store, exclusion)
    }

    pub fn with_exclusion(
        config: VeilConfig,
        store: Arc<dyn MappingStore>,
        exclusion: ExclusionFilter,
    ) -> Self {
        let assigner = Arc::new(AliasAssigner::from_config(&config.aliases));
        Self {
            normalizer: Normalizer::new(&config.normalizer),
            exclusion,
            resolver: Resolver::new(config.resolution.effective_ambiguity()),
            dedup: Deduplicator::new(Arc::clone(&store), Arc::clone(&assigner)),
            assigner,
            store,
            known: RwLock::new(KnownEntities::new()),
            config,
        }
    }

    /// Replace the alias assigner, e.g. with a custom generator for a type.
    pub fn with_assigner(mut self, assigner: AliasAssigner) -> Self {
        self.assigner = Arc::new(assigner);
        self.dedup = Deduplicator::new(Arc::clone(&self.store), Arc::clone(&self.assigner));
        self
    }

    /// Open the SQLite mapping store at `storage.db_path` and build the engine
    /// on it.
    pub fn open(config: VeilConfig, cipher: Arc<dyn DeterministicCipher>) -> VeilResult<Self> {
        let store = SqliteMappingStore::open_from_config(&config.storage, cipher)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    pub fn config(&self) -> &VeilConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn MappingStore> {
        &self.store
    }

    pub fn exclusion(&self) -> &ExclusionFilter {
        &self.exclusion
    }

    pub fn assigner(&self) -> &AliasAssigner {
        &self.assigner
    }

    pub fn worker(&self) -> DocumentWorker<'_> {
        self.worker_in(None)
    }

    /// Worker that also resolves against entities first seen in a batch.
    pub fn batch_worker<'a>(&'a self, batch: &'a KnownEntities) -> DocumentWorker<'a> {
        self.worker_in(Some(batch))
    }

    fn worker_in<'a>(&'a self, batch: Option<&'a KnownEntities>) -> DocumentWorker<'a> {
        DocumentWorker {
            normalizer: &self.normalizer,
            exclusion: &self.exclusion,
            resolver: self.resolver,
            known: &self.known,
            batch,
            store: self.store.as_ref(),
            dedup: &self.dedup,
        }
    }

    /// Entities `inputs` introduce beyond the store, for
    /// [`process_in_batch`](Self::process_in_batch).
    pub fn batch_scope(&self, inputs: &[DocumentInput]) -> VeilResult<KnownEntities> {
        self.worker().batch_scope(inputs)
    }

    /// Pick up entries other workers or processes wrote since the last sync.
    pub fn sync(&self) -> VeilResult<SyncStats> {
        let mut known = self.known.write().map_err(|_| StorageError::Unavailable {
            message: "known entity index lock poisoned".to_string(),
        })?;
        known.sync_from_store(self.store.as_ref())
    }

    /// Alias already assigned to `key`. Never allocates one.
    pub fn lookup(&self, key: &CanonicalKey) -> VeilResult<Option<String>> {
        self.store.lookup(key)
    }

    /// First phase of an interactive review: group the document's
    /// occurrences without writing anything.
    pub fn prepare(
        &self,
        document: Document,
        occurrences: Vec<RawOccurrence>,
    ) -> VeilResult<PreparedDocument> {
        self.worker().prepare(DocumentInput::new(document, occurrences))
    }

    /// Second phase: apply the decisions recorded on `prepared`.
    pub fn finalize(
        &self,
        prepared: PreparedDocument,
        cancel: &dyn Cancellable,
    ) -> VeilResult<DocumentOutcome> {
        self.worker().finalize(prepared, cancel)
    }

    /// Prepare, review with `reviewer`, finalize.
    pub fn process_document(
        &self,
        input: DocumentInput,
        reviewer: &dyn Reviewer,
        cancel: &dyn Cancellable,
    ) -> VeilResult<DocumentOutcome> {
        review_and_finalize(&self.worker(), input, reviewer, cancel)
    }

    /// [`process_document`](Self::process_document) for one document of a
    /// batch whose scope is `batch`.
    pub fn process_in_batch(
        &self,
        input: DocumentInput,
        batch: &KnownEntities,
        reviewer: &dyn Reviewer,
        cancel: &dyn Cancellable,
    ) -> VeilResult<DocumentOutcome> {
        review_and_finalize(&self.batch_worker(batch), input, reviewer, cancel)
    }

    /// Run a batch on a fresh pool sized by `batch.threads`.
    pub fn run_batch(
        &self,
        inputs: Vec<DocumentInput>,
        reviewer: &dyn Reviewer,
        cancel: &CancellationToken,
    ) -> VeilResult<BatchReport> {
        let runner = BatchRunner::from_config(&self.config.batch)?;
        Ok(runner.run(self, inputs, reviewer, cancel))
    }
}

fn review_and_finalize(
    worker: &DocumentWorker<'_>,
    input: DocumentInput,
    reviewer: &dyn Reviewer,
    cancel: &dyn Cancellable,
) -> VeilResult<DocumentOutcome> {
    cancel.check()?;
    let mut prepared = worker.prepare(input)?;

    for index in 0..prepared.groups().len() {
        let group = &prepared.groups()[index];
        if group.is_ambiguous() {
            if let Some(candidate) = reviewer.disambiguate(group) {
                if let Err(e) = prepared.disambiguate(index, &candidate) {
                    tracing::warn!(error = %e, "reviewer picked an invalid candidate");
                }
            }
        }
        let decision = reviewer.review(&prepared.groups()[index]);
        prepared.decide(index, decision)?;
    }

    worker.finalize(prepared, cancel)
}

impl std::fmt::Debug for PseudonymEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PseudonymEngine")
            .field("resolver", &self.resolver)
            .field("assigner", &self.assigner)
            .finish_non_exhaustive()
    }
}
