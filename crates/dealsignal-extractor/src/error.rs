//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// None of these escape `SignalExtractor::extract`; model failures are turned
/// into a rule-based fallback. They surface from configuration and from the
/// reply parser.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Model reply did not contain a usable signal array
    #[error("Invalid model output: {0}")]
    InvalidFormat(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
