//! Wiring of the library crates behind the commands.

use crate::config::Config;
use crate::error::Result;
use dealsignal_crawler::FirmEnricher;
use dealsignal_extractor::SignalExtractor;
use dealsignal_llm::OpenAiProvider;
use dealsignal_pipeline::{shared, Ingestor, PipelineError, SharedStore, SignalProcessor};
use dealsignal_store::SqliteStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::MutexGuard;
use tracing::{debug, info};

/// Opened database plus the loaded configuration.
pub struct App {
    config: Config,
    store: SharedStore<SqliteStore>,
}

impl App {
    /// Open the database (`db_override` wins over the configured path).
    pub fn open(config: Config, db_override: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match db_override {
            Some(path) => path.to_path_buf(),
            None => config.database_path()?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        debug!("Opening database at {}", path.display());
        let store = SqliteStore::new(&path)?;
        Ok(Self {
            config,
            store: shared(store),
        })
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared store handle.
    pub fn store(&self) -> &SharedStore<SqliteStore> {
        &self.store
    }

    /// Lock the store for a direct read.
    pub fn lock_store(&self) -> Result<MutexGuard<'_, SqliteStore>> {
        self.store
            .lock()
            .map_err(|_| PipelineError::Store("store lock poisoned".to_string()).into())
    }

    /// Build an ingestor over the store.
    pub fn ingestor(&self) -> Ingestor<SqliteStore> {
        Ingestor::new(self.store.clone(), &self.config.extractor)
    }

    /// Build a processor; rule-based only when no API key is configured.
    pub fn processor(&self) -> Result<SignalProcessor<SqliteStore, OpenAiProvider>> {
        let llm = OpenAiProvider::from_config(&self.config.llm)?;
        if llm.is_none() {
            info!(
                "No API key in {}, using rule-based extraction only",
                self.config.llm.api_key_env
            );
        }
        let extractor = SignalExtractor::new(llm, self.config.extractor.clone())?;
        Ok(SignalProcessor::new(
            self.store.clone(),
            extractor,
            self.config.pipeline.clone(),
        )?)
    }

    /// Build a website enricher.
    pub fn enricher(&self, ingest: bool) -> Result<FirmEnricher<SqliteStore>> {
        let mut crawler = self.config.crawler.clone();
        crawler.ingest_pages = crawler.ingest_pages && ingest;
        Ok(FirmEnricher::new(
            self.store.clone(),
            crawler,
            &self.config.extractor,
        )?)
    }
}
