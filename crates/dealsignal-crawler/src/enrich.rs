//! Firm profile enrichment from a website

use crate::fetch::{parse_site_url, Page, PageFetcher};
use crate::{html, CrawlError, CrawlerConfig};
use dealsignal_domain::traits::{ProfileStore, SignalStore};
use dealsignal_domain::{now_millis, DocumentId, FirmProfile, SourceKind};
use dealsignal_extractor::{ExtractorConfig, ProfileExtractor};
use dealsignal_pipeline::{Ingestor, NewDocument, PipelineError, SharedStore};
use std::fmt;
use std::sync::MutexGuard;
use tracing::{debug, info, warn};
use url::Url;

/// What one enrichment run did
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentReport {
    /// Profile key
    pub firm_key: String,
    /// Pages fetched successfully, homepage first
    pub pages_fetched: Vec<String>,
    /// Subpages that could not be fetched
    pub pages_failed: usize,
    /// Profile fields found on this run
    pub fields_found: usize,
    /// Web-page document created from the crawled text, if any
    pub document_id: Option<DocumentId>,
    /// The stored profile after the run
    pub profile: FirmProfile,
}

/// Crawls a firm website and overwrites its stored profile
pub struct FirmEnricher<S> {
    fetcher: PageFetcher,
    store: SharedStore<S>,
    ingestor: Option<Ingestor<S>>,
    extractor: ProfileExtractor,
    config: CrawlerConfig,
}

impl<S> FirmEnricher<S>
where
    S: SignalStore + ProfileStore,
    <S as SignalStore>::Error: fmt::Display,
    <S as ProfileStore>::Error: fmt::Display,
{
    /// Create an enricher; crawled text is ingested when `config.ingest_pages` is set
    pub fn new(
        store: SharedStore<S>,
        config: CrawlerConfig,
        extractor_config: &ExtractorConfig,
    ) -> Result<Self, CrawlError> {
        let fetcher = PageFetcher::new(&config)?;
        let ingestor = config
            .ingest_pages
            .then(|| Ingestor::new(store.clone(), extractor_config));
        Ok(Self {
            fetcher,
            store,
            ingestor,
            extractor: ProfileExtractor::new(),
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawl `site` and apply what was found to the profile stored under `firm_key`
    ///
    /// The homepage must load; subpage failures are counted and skipped.
    pub async fn enrich(&self, firm_key: &str, site: &str) -> Result<EnrichmentReport, CrawlError> {
        let site_url = parse_site_url(site)?;
        info!(firm = firm_key, url = %site_url, "Enriching firm profile");

        let home = self.fetcher.fetch(&site_url).await?;
        let mut pages_fetched = vec![home.url.to_string()];
        let mut pages_failed = 0;
        let mut texts = vec![html::visible_text(&home.html)];

        for link in self.follow_links(&home) {
            match self.fetcher.fetch(&link).await {
                Ok(page) => {
                    texts.push(html::visible_text(&page.html));
                    pages_fetched.push(page.url.to_string());
                }
                Err(e) => {
                    warn!(firm = firm_key, url = %link, "Skipping subpage: {}", e);
                    pages_failed += 1;
                }
            }
        }

        let combined = texts.join("\n\n");
        let title = html::title(&home.html);
        let mut enrichment = self.extractor.extract(&combined);
        enrichment.name = title.as_deref().map(firm_name);
        enrichment.description = html::meta_description(&home.html);
        let fields_found = enrichment.field_count();

        let profile = {
            let mut store = self.lock_store()?;
            let mut profile = store
                .get_profile(firm_key)
                .map_err(|e| CrawlError::Store(e.to_string()))?
                .unwrap_or_else(|| FirmProfile::new(firm_key));
            profile.apply(enrichment, now_millis());
            profile.website = Some(site_url.to_string());
            store
                .save_profile(&profile)
                .map_err(|e| CrawlError::Store(e.to_string()))?;
            profile
        };

        let document_id = match &self.ingestor {
            Some(ingestor) => {
                let doc_title = title.unwrap_or_else(|| site_url.to_string());
                match ingestor.ingest(NewDocument::new(doc_title, SourceKind::WebPage, combined)) {
                    Ok(id) => Some(id),
                    Err(PipelineError::EmptyDocument) => {
                        debug!(firm = firm_key, "No visible text to ingest");
                        None
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => None,
        };

        info!(
            firm = firm_key,
            pages = pages_fetched.len(),
            failed = pages_failed,
            fields = fields_found,
            "Profile enriched"
        );

        Ok(EnrichmentReport {
            firm_key: firm_key.to_string(),
            pages_fetched,
            pages_failed,
            fields_found,
            document_id,
            profile,
        })
    }

    /// Same-host links whose path contains a follow keyword, capped at `max_about_pages`
    fn follow_links(&self, home: &Page) -> Vec<Url> {
        html::same_host_links(&home.html, &home.url)
            .into_iter()
            .filter(|link| link.path() != home.url.path())
            .filter(|link| {
                let path = link.path().to_lowercase();
                self.config
                    .follow_keywords
                    .iter()
                    .any(|k| path.contains(&k.to_lowercase()))
            })
            .take(self.config.max_about_pages)
            .collect()
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, S>, CrawlError> {
        self.store
            .lock()
            .map_err(|_| CrawlError::Store("store lock poisoned".to_string()))
    }
}

const TITLE_SEPARATORS: [&str; 5] = [" | ", " - ", " – ", " — ", " · "];

/// Firm name from a page title: the part before the first separator
fn firm_name(title: &str) -> String {
    let cut = TITLE_SEPARATORS
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .unwrap_or(title.len());
    let name = title[..cut].trim();
    if name.is_empty() {
        title.trim().to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firm_name_from_title() {
        assert_eq!(firm_name("Northwind Ventures | Seed Fund"), "Northwind Ventures");
        assert_eq!(firm_name("Acme Capital - About"), "Acme Capital");
        assert_eq!(firm_name("Solo"), "Solo");
        assert_eq!(firm_name(" | Leading pipe"), "| Leading pipe");
    }
}
