//! Error types for pipeline operations

use thiserror::Error;

/// Errors that can occur in the processing pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The requested document does not exist
    #[error("Document not found")]
    DocumentNotFound,

    /// Another run holds the document's claim
    #[error("Document is already being processed")]
    AlreadyProcessing,

    /// Ingested text had no content
    #[error("Document has no text")]
    EmptyDocument,

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<dealsignal_extractor::ExtractorError> for PipelineError {
    fn from(e: dealsignal_extractor::ExtractorError) -> Self {
        PipelineError::Config(e.to_string())
    }
}
