//! Background worker that processes pending documents on a schedule

use crate::{BatchOutcome, Orchestrator, PipelineError, PipelineMetrics};
use dealsignal_domain::traits::{LlmProvider, SignalStore};
use std::fmt;
use std::time::Instant;
use tokio::time::{interval, Duration};

/// Runs a batch every poll interval until Ctrl+C
///
/// # Examples
///
/// ```no_run
/// use dealsignal_extractor::{ExtractorConfig, SignalExtractor};
/// use dealsignal_llm::MockProvider;
/// use dealsignal_pipeline::{shared, Orchestrator, PipelineConfig, PipelineWorker, SignalProcessor};
/// use dealsignal_store::SqliteStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = shared(SqliteStore::new("dealsignal.db")?);
///     let extractor = SignalExtractor::<MockProvider>::new(None, ExtractorConfig::default())?;
///     let processor = SignalProcessor::new(store, extractor, PipelineConfig::default())?;
///     let mut worker = PipelineWorker::new(Orchestrator::new(processor));
///
///     // Run until Ctrl+C
///     worker.run().await?;
///     Ok(())
/// }
/// ```
pub struct PipelineWorker<S, L> {
    orchestrator: Orchestrator<S, L>,
    interval: Duration,
    metrics: PipelineMetrics,
}

impl<S, L> PipelineWorker<S, L>
where
    S: SignalStore,
    S::Error: fmt::Display,
    L: LlmProvider,
{
    /// Create a worker polling at the processor's configured interval
    pub fn new(orchestrator: Orchestrator<S, L>) -> Self {
        let interval = orchestrator.processor().config().poll_interval();
        Self {
            orchestrator,
            interval,
            metrics: PipelineMetrics::new(),
        }
    }

    /// The polling interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until a shutdown signal (Ctrl+C) is received
    ///
    /// A failed batch is logged and the worker keeps polling.
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        let mut ticker = interval(self.interval);

        tracing::info!("Pipeline worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_batch().await {
                        tracing::error!("Batch failed: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping pipeline worker");
                    break;
                }
            }
        }

        tracing::info!("Pipeline worker stopped. Final metrics:\n{}", self.metrics.summary());
        Ok(())
    }

    /// Run a fixed number of batches, stopping at the first batch error
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<(), PipelineError> {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Pipeline worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting batch {}/{}", cycle + 1, cycles);

            if let Err(e) = self.run_batch().await {
                tracing::error!("Batch {}/{} failed: {}", cycle + 1, cycles, e);
                return Err(e);
            }
        }

        tracing::info!(
            "Pipeline worker finished {} cycles. Final metrics:\n{}",
            cycles,
            self.metrics.summary()
        );
        Ok(())
    }

    async fn run_batch(&mut self) -> Result<BatchOutcome, PipelineError> {
        let started = Instant::now();
        let batch = self.orchestrator.process_all_pending().await?;
        self.metrics
            .record_batch(&batch, started.elapsed().as_millis() as u64);
        Ok(batch)
    }

    /// Metrics accumulated since creation or the last reset
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Reset the metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}
