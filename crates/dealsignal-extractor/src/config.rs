//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Text chunking strategy for ingested documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Split by paragraphs (blank lines)
    #[default]
    ByParagraph,
    /// Split by sections (markdown headers or numbered sections)
    BySection,
    /// Split at sentence boundaries within a character budget
    ByCharCount,
}

/// Configuration for signal extraction and chunking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Texts shorter than this (in characters) yield no signals and no model call
    pub min_text_chars: usize,

    /// Text sent to the model is truncated to this many characters
    pub max_ai_chars: usize,

    /// Chunking strategy used at ingestion
    pub chunk_strategy: ChunkStrategy,

    /// Maximum chunk size (characters)
    pub max_chunk_size: usize,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_ai_chars == 0 {
            return Err("max_ai_chars must be greater than 0".to_string());
        }
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.min_text_chars > self.max_chunk_size {
            return Err("min_text_chars cannot exceed max_chunk_size".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 100,
            max_ai_chars: 8_000,
            chunk_strategy: ChunkStrategy::ByParagraph,
            max_chunk_size: 4_000,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: small chunks and a short model budget
    pub fn aggressive() -> Self {
        Self {
            max_ai_chars: 4_000,
            chunk_strategy: ChunkStrategy::ByCharCount,
            max_chunk_size: 2_000,
            ..Self::default()
        }
    }

    /// Lenient preset: section-sized chunks that use the full model budget
    pub fn lenient() -> Self {
        Self {
            chunk_strategy: ChunkStrategy::BySection,
            max_chunk_size: 8_000,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_text_chars, 100);
        assert_eq!(config.max_ai_chars, 8_000);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::aggressive().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_max_ai_chars() {
        let mut config = ExtractorConfig::default();
        config.max_ai_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_text_larger_than_chunk_is_invalid() {
        let mut config = ExtractorConfig::default();
        config.min_text_chars = config.max_chunk_size + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("by_section"));

        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = ExtractorConfig::from_toml("max_chunk_size = 1000").unwrap();
        assert_eq!(parsed.max_chunk_size, 1000);
        assert_eq!(parsed.min_text_chars, 100);
    }
}
