//! Per-document signal processing and aggregate queries

use crate::{with_store, PipelineConfig, PipelineError, SharedStore};
use dealsignal_domain::confidence::HIGH_CONFIDENCE_THRESHOLD;
use dealsignal_domain::traits::{LlmProvider, SignalQuery, SignalStore};
use dealsignal_domain::{now_millis, DocumentId, Signal, SignalType};
use dealsignal_extractor::{ExtractionSource, SignalExtractor};
use std::fmt;
use tracing::{debug, error, info, warn};

/// How the chunks of a run were handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkTally {
    /// Chunks answered by the language model
    pub ai: usize,
    /// Chunks handled by the rule-based extractor
    pub rule_based: usize,
    /// Chunks below the minimum length
    pub skipped: usize,
}

impl ChunkTally {
    pub(crate) fn record(&mut self, source: ExtractionSource) {
        match source {
            ExtractionSource::Ai => self.ai += 1,
            ExtractionSource::RuleBased => self.rule_based += 1,
            ExtractionSource::Skipped => self.skipped += 1,
        }
    }

    pub(crate) fn add(&mut self, other: &ChunkTally) {
        self.ai += other.ai;
        self.rule_based += other.rule_based;
        self.skipped += other.skipped;
    }
}

/// Result of processing one document
///
/// `error` is set whenever the document was not processed; `signals_extracted`
/// is then 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Signals stored for the document
    pub signals_extracted: usize,
    /// Failure message, if any
    pub error: Option<String>,
    /// Per-chunk extraction paths
    pub chunks: ChunkTally,
}

impl ProcessOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            signals_extracted: 0,
            error: Some(message.into()),
            chunks: ChunkTally::default(),
        }
    }

    /// Whether the document was processed
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate view over all stored signals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalsSummary {
    /// Total signal count
    pub total: usize,
    /// Counts per signal type, largest first
    pub by_type: Vec<(SignalType, usize)>,
    /// Counts per sector (top N, unknown sectors excluded), largest first
    pub by_sector: Vec<(String, usize)>,
    /// Signals with confidence strictly above 0.7
    pub high_confidence: usize,
}

impl fmt::Display for SignalsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total signals: {}", self.total)?;
        writeln!(f, "High confidence (> {}): {}", HIGH_CONFIDENCE_THRESHOLD, self.high_confidence)?;
        for (signal_type, count) in &self.by_type {
            writeln!(f, "  {}: {}", signal_type, count)?;
        }
        for (sector, count) in &self.by_sector {
            writeln!(f, "  sector {}: {}", sector, count)?;
        }
        Ok(())
    }
}

/// Runs extraction for stored documents and records the results
pub struct SignalProcessor<S, L> {
    store: SharedStore<S>,
    extractor: SignalExtractor<L>,
    config: PipelineConfig,
}

impl<S, L> SignalProcessor<S, L>
where
    S: SignalStore,
    S::Error: fmt::Display,
    L: LlmProvider,
{
    /// Create a processor over a shared store
    pub fn new(
        store: SharedStore<S>,
        extractor: SignalExtractor<L>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self {
            store,
            extractor,
            config,
        })
    }

    /// The shared store handle
    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    /// The extractor in use
    pub fn extractor(&self) -> &SignalExtractor<L> {
        &self.extractor
    }

    /// The active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one document
    ///
    /// Never fails: a missing document, a held claim or an internal error are
    /// reported through `ProcessOutcome::error`. Internal errors also mark the
    /// document failed.
    pub async fn process_document(&self, id: DocumentId) -> ProcessOutcome {
        match self.try_process(id).await {
            Ok(outcome) => outcome,
            Err(e @ (PipelineError::DocumentNotFound | PipelineError::AlreadyProcessing)) => {
                warn!(document = %id, "Not processing: {}", e);
                ProcessOutcome::failed(e.to_string())
            }
            Err(e) => {
                let message = e.to_string();
                error!(document = %id, "Processing failed: {}", message);
                if let Err(mark_err) = with_store(&self.store, |s| s.mark_failed(id, &message)) {
                    error!(document = %id, "Could not mark document failed: {}", mark_err);
                }
                ProcessOutcome::failed(message)
            }
        }
    }

    /// Requeue documents whose processing claim outlived the lease
    ///
    /// A run that is cancelled or killed mid-extraction leaves its document
    /// `extracting`; this puts such documents back into `pending`.
    pub fn release_stale_claims(&self) -> Result<usize, PipelineError> {
        let lease_ms = self.lease_ms();
        with_store(&self.store, |s| s.release_stale_claims(now_millis(), lease_ms))
    }

    fn lease_ms(&self) -> u64 {
        self.config.claim_lease().as_millis() as u64
    }

    async fn try_process(&self, id: DocumentId) -> Result<ProcessOutcome, PipelineError> {
        let document =
            with_store(&self.store, |s| s.get_document(id))?.ok_or(PipelineError::DocumentNotFound)?;

        let lease_ms = self.lease_ms();
        if !with_store(&self.store, |s| s.claim_document(id, now_millis(), lease_ms))? {
            return Err(PipelineError::AlreadyProcessing);
        }

        let chunks = with_store(&self.store, |s| s.get_chunks(id))?;
        info!(document = %id, title = %document.title, chunks = chunks.len(), "Processing document");

        let min_chars = self.extractor.config().min_text_chars;
        let mut tally = ChunkTally::default();
        let mut extracted = Vec::new();

        for chunk in &chunks {
            if chunk.content.chars().count() < min_chars {
                debug!(document = %id, chunk = chunk.chunk_index, "Skipping short chunk");
                tally.skipped += 1;
                continue;
            }
            let extraction = self
                .extractor
                .extract(&chunk.content, document.source_weight)
                .await;
            tally.record(extraction.source);
            extracted.extend(extraction.signals);
        }

        let now = now_millis();
        let signals: Vec<Signal> = extracted
            .into_iter()
            .map(|e| Signal::from_extracted(id, e, now))
            .collect();

        let stored = with_store(&self.store, |s| s.replace_signals(id, &signals))?;
        with_store(&self.store, |s| s.mark_completed(id, now))?;

        info!(
            document = %id,
            signals = stored,
            ai_chunks = tally.ai,
            rule_chunks = tally.rule_based,
            skipped_chunks = tally.skipped,
            "Document completed"
        );

        Ok(ProcessOutcome {
            signals_extracted: stored,
            error: None,
            chunks: tally,
        })
    }

    /// Aggregate counts over all stored signals
    pub fn summary(&self) -> Result<SignalsSummary, PipelineError> {
        let top_sectors = self.config.top_sectors;
        with_store(&self.store, |s| -> Result<SignalsSummary, S::Error> {
            Ok(SignalsSummary {
                total: s.count_signals()?,
                by_type: s.count_by_type()?,
                by_sector: s.count_by_sector(top_sectors)?,
                high_confidence: s.count_above_confidence(HIGH_CONFIDENCE_THRESHOLD)?,
            })
        })
    }

    /// Most recent signals, newest first
    pub fn recent_signals(&self, limit: usize) -> Result<Vec<Signal>, PipelineError> {
        let query = SignalQuery {
            limit: Some(limit),
            ..Default::default()
        };
        with_store(&self.store, |s| s.query_signals(&query))
    }

    /// All signals of one document, newest first
    pub fn document_signals(&self, id: DocumentId) -> Result<Vec<Signal>, PipelineError> {
        let query = SignalQuery {
            document_id: Some(id),
            ..Default::default()
        };
        with_store(&self.store, |s| s.query_signals(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;
    use dealsignal_domain::{
        claim_expired, DocumentChunk, ProcessingStatus, SourceDocument, SourceKind,
    };
    use dealsignal_extractor::ExtractorConfig;
    use dealsignal_llm::MockProvider;
    use std::collections::HashMap;

    // Mock store for testing failure paths the SQLite store cannot produce
    #[derive(Default)]
    struct MockStore {
        documents: HashMap<DocumentId, SourceDocument>,
        chunks: HashMap<DocumentId, Vec<DocumentChunk>>,
        signals: Vec<Signal>,
        claims: HashMap<DocumentId, u64>,
        fail_replace: bool,
    }

    impl SignalStore for MockStore {
        type Error = String;

        fn insert_document(
            &mut self,
            document: &SourceDocument,
            chunks: &[DocumentChunk],
        ) -> Result<(), Self::Error> {
            self.documents.insert(document.id, document.clone());
            self.chunks.insert(document.id, chunks.to_vec());
            Ok(())
        }

        fn get_document(&self, id: DocumentId) -> Result<Option<SourceDocument>, Self::Error> {
            Ok(self.documents.get(&id).cloned())
        }

        fn get_chunks(&self, id: DocumentId) -> Result<Vec<DocumentChunk>, Self::Error> {
            Ok(self.chunks.get(&id).cloned().unwrap_or_default())
        }

        fn documents_with_status(
            &self,
            status: ProcessingStatus,
        ) -> Result<Vec<SourceDocument>, Self::Error> {
            Ok(self
                .documents
                .values()
                .filter(|d| d.status == status)
                .cloned()
                .collect())
        }

        fn claim_document(
            &mut self,
            id: DocumentId,
            now: u64,
            lease_ms: u64,
        ) -> Result<bool, Self::Error> {
            let claimed_at = self.claims.get(&id).copied();
            match self.documents.get_mut(&id) {
                Some(d)
                    if d.status.is_claimable() || claim_expired(claimed_at, now, lease_ms) =>
                {
                    d.status = ProcessingStatus::Extracting;
                    self.claims.insert(id, now);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        fn release_stale_claims(&mut self, now: u64, lease_ms: u64) -> Result<usize, Self::Error> {
            let mut released = 0;
            for d in self.documents.values_mut() {
                let claimed_at = self.claims.get(&d.id).copied();
                if d.status == ProcessingStatus::Extracting
                    && claim_expired(claimed_at, now, lease_ms)
                {
                    d.status = ProcessingStatus::Pending;
                    released += 1;
                }
            }
            Ok(released)
        }

        fn mark_completed(&mut self, id: DocumentId, at: u64) -> Result<(), Self::Error> {
            let d = self.documents.get_mut(&id).ok_or("missing")?;
            d.status = ProcessingStatus::Completed;
            d.processed_at = Some(at);
            Ok(())
        }

        fn mark_failed(&mut self, id: DocumentId, reason: &str) -> Result<(), Self::Error> {
            let d = self.documents.get_mut(&id).ok_or("missing")?;
            d.status = ProcessingStatus::Failed;
            d.last_error = Some(reason.to_string());
            Ok(())
        }

        fn replace_signals(&mut self, id: DocumentId, signals: &[Signal]) -> Result<usize, Self::Error> {
            if self.fail_replace {
                return Err("disk full".to_string());
            }
            self.signals.retain(|s| s.document_id != id);
            self.signals.extend_from_slice(signals);
            Ok(signals.len())
        }

        fn query_signals(&self, query: &SignalQuery) -> Result<Vec<Signal>, Self::Error> {
            let mut results: Vec<Signal> = self
                .signals
                .iter()
                .filter(|s| query.document_id.map_or(true, |id| s.document_id == id))
                .cloned()
                .collect();
            if let Some(limit) = query.limit {
                results.truncate(limit);
            }
            Ok(results)
        }

        fn count_signals(&self) -> Result<usize, Self::Error> {
            Ok(self.signals.len())
        }

        fn count_by_type(&self) -> Result<Vec<(SignalType, usize)>, Self::Error> {
            Ok(Vec::new())
        }

        fn count_by_sector(&self, _limit: usize) -> Result<Vec<(String, usize)>, Self::Error> {
            Ok(Vec::new())
        }

        fn count_above_confidence(&self, threshold: f64) -> Result<usize, Self::Error> {
            Ok(self
                .signals
                .iter()
                .filter(|s| s.confidence_score > threshold)
                .count())
        }
    }

    const LONG_CHUNK: &str = "Analysts expect a CAGR of 23.5% for embedded finance through the decade, \
        driven by platform adoption among mid-market software vendors.";

    fn processor(store: MockStore) -> SignalProcessor<MockStore, MockProvider> {
        let extractor = SignalExtractor::new(None, ExtractorConfig::default()).unwrap();
        SignalProcessor::new(shared(store), extractor, PipelineConfig::default()).unwrap()
    }

    fn seeded(chunks: &[&str]) -> (MockStore, DocumentId) {
        let mut store = MockStore::default();
        let doc = SourceDocument::new("report", SourceKind::ResearchFile, None, 1);
        let chunks: Vec<DocumentChunk> = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| DocumentChunk {
                document_id: doc.id,
                chunk_index: i as u32,
                content: c.to_string(),
            })
            .collect();
        store.insert_document(&doc, &chunks).unwrap();
        (store, doc.id)
    }

    #[tokio::test]
    async fn test_missing_document() {
        let processor = processor(MockStore::default());
        let outcome = processor.process_document(DocumentId::new()).await;

        assert_eq!(outcome.signals_extracted, 0);
        assert_eq!(outcome.error.as_deref(), Some("Document not found"));
    }

    #[tokio::test]
    async fn test_processes_and_skips_short_chunks() {
        let (store, id) = seeded(&["too short", LONG_CHUNK]);
        let processor = processor(store);

        let outcome = processor.process_document(id).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.signals_extracted, 1);
        assert_eq!(outcome.chunks.skipped, 1);
        assert_eq!(outcome.chunks.rule_based, 1);

        let store = processor.store().lock().unwrap();
        assert_eq!(
            store.documents[&id].status,
            ProcessingStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_store_failure_marks_document_failed() {
        let (mut store, id) = seeded(&[LONG_CHUNK]);
        store.fail_replace = true;
        let processor = processor(store);

        let outcome = processor.process_document(id).await;
        assert_eq!(outcome.signals_extracted, 0);
        assert!(outcome.error.as_deref().unwrap().contains("disk full"));

        let store = processor.store().lock().unwrap();
        let doc = &store.documents[&id];
        assert_eq!(doc.status, ProcessingStatus::Failed);
        assert!(doc.last_error.as_deref().unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn test_held_claim_is_reported() {
        let (mut store, id) = seeded(&[LONG_CHUNK]);
        store.claim_document(id, now_millis(), 60_000).unwrap();
        let processor = processor(store);

        let outcome = processor.process_document(id).await;
        assert_eq!(
            outcome.error.as_deref(),
            Some("Document is already being processed")
        );
        // The holder's claim is left alone
        let store = processor.store().lock().unwrap();
        assert_eq!(store.documents[&id].status, ProcessingStatus::Extracting);
    }

    #[tokio::test]
    async fn test_abandoned_claim_is_taken_over_after_lease() {
        let (mut store, id) = seeded(&[LONG_CHUNK]);
        // Claimed long ago by a run that never finished
        store.claim_document(id, 1, 60_000).unwrap();
        let processor = processor(store);

        let outcome = processor.process_document(id).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.signals_extracted, 1);
        let store = processor.store().lock().unwrap();
        assert_eq!(store.documents[&id].status, ProcessingStatus::Completed);
    }

    #[tokio::test]
    async fn test_release_stale_claims_requeues_abandoned_document() {
        let (mut store, id) = seeded(&[LONG_CHUNK]);
        store.claim_document(id, 1, 60_000).unwrap();
        let processor = processor(store);

        assert_eq!(processor.release_stale_claims().unwrap(), 1);
        let store = processor.store().lock().unwrap();
        assert_eq!(store.documents[&id].status, ProcessingStatus::Pending);
    }

    #[test]
    fn test_summary_display() {
        let summary = SignalsSummary {
            total: 3,
            by_type: vec![(SignalType::Risk, 2), (SignalType::Trend, 1)],
            by_sector: vec![("Fintech".to_string(), 2)],
            high_confidence: 1,
        };
        let text = summary.to_string();
        assert!(text.contains("Total signals: 3"));
        assert!(text.contains("risk: 2"));
        assert!(text.contains("sector Fintech: 2"));
    }
}
