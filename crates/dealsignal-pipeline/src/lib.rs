//! Dealsignal Pipeline
//!
//! Moves documents from ingestion to stored signals.
//!
//! # Overview
//!
//! - **Ingestion**: chunk text and store it as a `pending` document
//! - **Processing**: claim a document, extract signals chunk by chunk, replace
//!   its previous signals and mark it `completed` (or `failed`)
//! - **Orchestration**: process every pending document in one sequential batch
//! - **Worker**: run batches on a schedule until Ctrl+C
//!
//! # Document lifecycle
//!
//! ```text
//! pending ──claim──→ extracting ──→ completed
//!                         └───────→ failed
//! ```
//!
//! The claim is an atomic status transition in the store, so two overlapping
//! runs never process the same document.
//!
//! # Usage
//!
//! ```
//! use dealsignal_domain::SourceKind;
//! use dealsignal_extractor::{ExtractorConfig, SignalExtractor};
//! use dealsignal_llm::MockProvider;
//! use dealsignal_pipeline::{shared, Ingestor, NewDocument, Orchestrator, PipelineConfig, SignalProcessor};
//! use dealsignal_store::SqliteStore;
//!
//! # tokio_test::block_on(async {
//! let store = shared(SqliteStore::new(":memory:").unwrap());
//! let extractor_config = ExtractorConfig::default();
//!
//! let ingestor = Ingestor::new(store.clone(), &extractor_config);
//! ingestor
//!     .ingest(NewDocument::new(
//!         "AI market brief",
//!         SourceKind::ResearchFile,
//!         "The global AI market is projected to reach $407 billion by 2027, growing at a \
//!          CAGR of 23.5% as enterprises adopt copilots.",
//!     ))
//!     .unwrap();
//!
//! let extractor = SignalExtractor::<MockProvider>::new(None, extractor_config).unwrap();
//! let processor = SignalProcessor::new(store, extractor, PipelineConfig::default()).unwrap();
//! let orchestrator = Orchestrator::new(processor);
//!
//! let batch = orchestrator.process_all_pending().await.unwrap();
//! assert_eq!(batch.processed, 1);
//! assert_eq!(batch.signals_extracted, 2);
//! # });
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod ingest;
mod metrics;
mod orchestrator;
mod processor;
mod worker;

use std::fmt;
use std::sync::{Arc, Mutex};

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use ingest::{Ingestor, NewDocument};
pub use metrics::PipelineMetrics;
pub use orchestrator::{BatchOutcome, Orchestrator, READY_STATUS};
pub use processor::{ChunkTally, ProcessOutcome, SignalProcessor, SignalsSummary};
pub use worker::PipelineWorker;

/// A store shared between the ingestor, the processor and the worker
///
/// The lock is only held for individual store calls, never across an await.
pub type SharedStore<S> = Arc<Mutex<S>>;

/// Wrap a store for sharing
pub fn shared<S>(store: S) -> SharedStore<S> {
    Arc::new(Mutex::new(store))
}

/// Run one store operation under the lock, mapping its error
pub(crate) fn with_store<S, T, E>(
    store: &SharedStore<S>,
    op: impl FnOnce(&mut S) -> Result<T, E>,
) -> Result<T, PipelineError>
where
    E: fmt::Display,
{
    let mut guard = store
        .lock()
        .map_err(|_| PipelineError::Store("store lock poisoned".to_string()))?;
    op(&mut *guard).map_err(|e| PipelineError::Store(e.to_string()))
}
