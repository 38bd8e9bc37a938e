//! Error types for crawling and enrichment

use dealsignal_pipeline::PipelineError;
use thiserror::Error;

/// Errors that can occur while crawling a firm website
#[derive(Debug, Error)]
pub enum CrawlError {
    /// URL could not be parsed or is not http(s)
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Profile store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Ingesting the crawled text failed
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
