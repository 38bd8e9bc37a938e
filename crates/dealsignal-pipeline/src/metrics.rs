//! Metrics collected by the scheduled worker

use crate::orchestrator::BatchOutcome;

/// Running totals across worker batches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineMetrics {
    /// Batches completed
    pub batches: usize,

    /// Documents processed successfully
    pub documents_processed: usize,

    /// Documents that failed
    pub documents_failed: usize,

    /// Signals stored
    pub signals_extracted: usize,

    /// Chunks answered by the language model
    pub ai_chunks: usize,

    /// Chunks handled by the rule-based extractor
    pub rule_based_chunks: usize,

    /// Chunks below the minimum length
    pub skipped_chunks: usize,

    /// Time spent inside batches (milliseconds)
    pub total_runtime_ms: u64,
}

impl PipelineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one batch into the totals
    pub fn record_batch(&mut self, batch: &BatchOutcome, runtime_ms: u64) {
        self.batches += 1;
        self.documents_processed += batch.processed;
        self.documents_failed += batch.failed;
        self.signals_extracted += batch.signals_extracted;
        self.ai_chunks += batch.chunks.ai;
        self.rule_based_chunks += batch.chunks.rule_based;
        self.skipped_chunks += batch.chunks.skipped;
        self.total_runtime_ms += runtime_ms;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        [
            "Pipeline Metrics Summary".to_string(),
            "========================".to_string(),
            format!("Batches: {}", self.batches),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            String::new(),
            format!("Documents processed: {}", self.documents_processed),
            format!("Documents failed: {}", self.documents_failed),
            format!("Signals extracted: {}", self.signals_extracted),
            String::new(),
            "Chunks by path:".to_string(),
            format!("  ai: {}", self.ai_chunks),
            format!("  rule_based: {}", self.rule_based_chunks),
            format!("  skipped: {}", self.skipped_chunks),
        ]
        .join("\n")
    }
}
