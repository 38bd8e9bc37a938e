//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Implementations live in `dealsignal-store` and `dealsignal-llm`.

use crate::{
    DocumentChunk, DocumentId, FirmProfile, ProcessingStatus, Signal, SignalType, SourceDocument,
};
use std::fmt;
use std::future::Future;

/// Persistence for documents, chunks and signals
///
/// Implemented by the infrastructure layer (dealsignal-store)
pub trait SignalStore {
    /// Error type for store operations
    type Error;

    /// Insert a document together with its ordered chunks
    fn insert_document(
        &mut self,
        document: &SourceDocument,
        chunks: &[DocumentChunk],
    ) -> Result<(), Self::Error>;

    /// Get a document by ID
    fn get_document(&self, id: DocumentId) -> Result<Option<SourceDocument>, Self::Error>;

    /// Get a document's chunks ordered by chunk index
    fn get_chunks(&self, id: DocumentId) -> Result<Vec<DocumentChunk>, Self::Error>;

    /// List documents in the given state, oldest first
    fn documents_with_status(
        &self,
        status: ProcessingStatus,
    ) -> Result<Vec<SourceDocument>, Self::Error>;

    /// Atomically move a claimable document to `extracting`, stamping the claim at `now`
    ///
    /// A claim is a lease: a document left `extracting` by a run that never
    /// finished becomes claimable again once its claim is `lease_ms` old.
    /// Returns `false` when the document is missing or held by a live claim.
    fn claim_document(&mut self, id: DocumentId, now: u64, lease_ms: u64)
        -> Result<bool, Self::Error>;

    /// Move `extracting` documents whose claim has expired back to `pending`
    ///
    /// Returns the number of documents requeued.
    fn release_stale_claims(&mut self, now: u64, lease_ms: u64) -> Result<usize, Self::Error>;

    /// Mark a document `completed`
    fn mark_completed(&mut self, id: DocumentId, processed_at: u64) -> Result<(), Self::Error>;

    /// Mark a document `failed` with a reason
    fn mark_failed(&mut self, id: DocumentId, reason: &str) -> Result<(), Self::Error>;

    /// Delete the document's previous signals and insert the given ones
    fn replace_signals(&mut self, id: DocumentId, signals: &[Signal]) -> Result<usize, Self::Error>;

    /// Query signals, newest first
    fn query_signals(&self, query: &SignalQuery) -> Result<Vec<Signal>, Self::Error>;

    /// Total number of signals
    fn count_signals(&self) -> Result<usize, Self::Error>;

    /// Signal counts grouped by type
    fn count_by_type(&self) -> Result<Vec<(SignalType, usize)>, Self::Error>;

    /// Signal counts grouped by non-null sector, largest first
    fn count_by_sector(&self, limit: usize) -> Result<Vec<(String, usize)>, Self::Error>;

    /// Number of signals with a score strictly above `threshold`
    fn count_above_confidence(&self, threshold: f64) -> Result<usize, Self::Error>;
}

/// Query criteria for retrieving signals
#[derive(Debug, Clone, Default)]
pub struct SignalQuery {
    /// Only signals of this document
    pub document_id: Option<DocumentId>,

    /// Only signals of this type
    pub signal_type: Option<SignalType>,

    /// Minimum confidence score (inclusive)
    pub min_confidence: Option<f64>,

    /// Maximum results to return
    pub limit: Option<usize>,
}

/// Persistence for firm profiles
pub trait ProfileStore {
    /// Error type for store operations
    type Error;

    /// Get a profile by key
    fn get_profile(&self, key: &str) -> Result<Option<FirmProfile>, Self::Error>;

    /// Insert or overwrite a profile
    fn save_profile(&mut self, profile: &FirmProfile) -> Result<(), Self::Error>;
}

/// A chat-completion language model
///
/// Implemented by the infrastructure layer (dealsignal-llm). Implementations
/// perform exactly one request per call and never retry.
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: fmt::Display + Send;

    /// Name of the model answering requests
    fn model_name(&self) -> &str;

    /// Send a system instruction and a user message, returning the reply text
    fn complete(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
