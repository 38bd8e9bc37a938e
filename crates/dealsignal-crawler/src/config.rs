//! Configuration for the website crawler

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Crawler settings
///
/// # Examples
///
/// ```
/// use dealsignal_crawler::CrawlerConfig;
///
/// let config = CrawlerConfig::default();
/// assert_eq!(config.timeout_secs, 15);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Same-host subpages fetched after the homepage
    pub max_about_pages: usize,

    /// Path keywords that mark a link as worth following
    pub follow_keywords: Vec<String>,

    /// Store the crawled text as a web-page document for signal extraction
    pub ingest_pages: bool,
}

impl CrawlerConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }
        Ok(())
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

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: concat!("dealsignal-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            max_about_pages: 3,
            follow_keywords: ["about", "team", "portfolio", "people", "firm"]
                .into_iter()
                .map(String::from)
                .collect(),
            ingest_pages: true,
        }
    }
}
