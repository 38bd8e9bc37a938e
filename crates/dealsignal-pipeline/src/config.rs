//! Configuration for the processing pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for document processing and the scheduled worker
///
/// # Examples
///
/// ```
/// use dealsignal_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.poll_interval_secs, 300);
///
/// let config = PipelineConfig::aggressive();
/// assert_eq!(config.poll_interval_secs, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// How often the worker looks for pending documents (seconds)
    pub poll_interval_secs: u64,

    /// Number of sectors reported in the summary
    pub top_sectors: usize,

    /// Default number of signals returned by recent-signal queries
    pub recent_limit: usize,

    /// How long a processing claim holds before another run may take it over (seconds)
    pub claim_lease_secs: u64,
}

impl PipelineConfig {
    /// Get the poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Get the claim lease as a Duration
    pub fn claim_lease(&self) -> Duration {
        Duration::from_secs(self.claim_lease_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be greater than 0".to_string());
        }
        if self.top_sectors == 0 {
            return Err("top_sectors must be greater than 0".to_string());
        }
        if self.recent_limit == 0 {
            return Err("recent_limit must be greater than 0".to_string());
        }
        if self.claim_lease_secs == 0 {
            return Err("claim_lease_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Aggressive preset: poll every minute
    pub fn aggressive() -> Self {
        Self {
            poll_interval_secs: 60,
            ..Self::default()
        }
    }

    /// Lenient preset: poll hourly
    pub fn lenient() -> Self {
        Self {
            poll_interval_secs: 3600,
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

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 300,
            top_sectors: 10,
            recent_limit: 20,
            claim_lease_secs: 900,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_sectors, 10);
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(PipelineConfig::aggressive().validate().is_ok());
        assert!(PipelineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_is_invalid() {
        let config = PipelineConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_claim_lease_is_invalid() {
        let config = PipelineConfig {
            claim_lease_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(PipelineConfig::default().claim_lease(), Duration::from_secs(900));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::lenient();
        let parsed = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
