//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] dealsignal_store::StoreError),

    /// LLM client error
    #[error("LLM error: {0}")]
    Llm(#[from] dealsignal_llm::LlmError),

    /// Extractor error
    #[error("Extractor error: {0}")]
    Extractor(#[from] dealsignal_extractor::ExtractorError),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] dealsignal_pipeline::PipelineError),

    /// Crawler error
    #[error("Crawl error: {0}")]
    Crawl(#[from] dealsignal_crawler::CrawlError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}
