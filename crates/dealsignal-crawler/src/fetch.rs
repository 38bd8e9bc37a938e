//! HTTP page fetching

use crate::{CrawlError, CrawlerConfig};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// A fetched HTML page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Final URL after redirects
    pub url: Url,
    /// Response body
    pub html: String,
}

/// Fetches pages with a fixed timeout and user agent
///
/// One GET per page, no retries.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher from configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        config.validate().map_err(CrawlError::Config)?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// GET a page; any non-success status is an error
    pub async fn fetch(&self, url: &Url) -> Result<Page, CrawlError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await?;
        debug!(url = %final_url, bytes = html.len(), "Fetched page");

        Ok(Page {
            url: final_url,
            html,
        })
    }
}

/// Parse a user-supplied website address
///
/// A bare domain such as `northwind.vc` is treated as `https://northwind.vc`.
pub fn parse_site_url(raw: &str) -> Result<Url, CrawlError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&candidate).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(CrawlError::InvalidUrl(format!("{}: not an http(s) address", raw)));
    }
    Ok(url)
}
