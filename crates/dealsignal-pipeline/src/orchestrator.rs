//! Batch processing of pending documents

use crate::processor::{ChunkTally, SignalProcessor};
use crate::{with_store, PipelineError};
use dealsignal_domain::traits::{LlmProvider, SignalStore};
use dealsignal_domain::ProcessingStatus;
use std::fmt;
use tracing::info;

/// Status a document must have to be picked up by a batch
pub const READY_STATUS: ProcessingStatus = ProcessingStatus::Pending;

/// Result of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Documents processed successfully
    pub processed: usize,
    /// Signals stored across those documents
    pub signals_extracted: usize,
    /// Documents that reported an error
    pub failed: usize,
    /// Per-chunk extraction paths across the batch
    pub chunks: ChunkTally,
}

/// Runs the processor over every ready document, one at a time
pub struct Orchestrator<S, L> {
    processor: SignalProcessor<S, L>,
}

impl<S, L> Orchestrator<S, L>
where
    S: SignalStore,
    S::Error: fmt::Display,
    L: LlmProvider,
{
    /// Create an orchestrator around a processor
    pub fn new(processor: SignalProcessor<S, L>) -> Self {
        Self { processor }
    }

    /// The wrapped processor
    pub fn processor(&self) -> &SignalProcessor<S, L> {
        &self.processor
    }

    /// Process every document that is ready at call time
    ///
    /// Documents whose claim expired are requeued first. The ready set is
    /// then snapshotted, so `processed` never exceeds its size. A failed
    /// document is counted in `failed` and the batch moves on.
    pub async fn process_all_pending(&self) -> Result<BatchOutcome, PipelineError> {
        self.processor.release_stale_claims()?;
        let ready = with_store(self.processor.store(), |s| s.documents_with_status(READY_STATUS))?;
        info!(documents = ready.len(), "Starting batch");

        let mut batch = BatchOutcome::default();
        for document in ready {
            let outcome = self.processor.process_document(document.id).await;
            batch.chunks.add(&outcome.chunks);
            if outcome.is_success() {
                batch.processed += 1;
                batch.signals_extracted += outcome.signals_extracted;
            } else {
                batch.failed += 1;
            }
        }

        info!(
            processed = batch.processed,
            failed = batch.failed,
            signals = batch.signals_extracted,
            "Batch finished"
        );
        Ok(batch)
    }
}
