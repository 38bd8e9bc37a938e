//! Dealsignal Crawler
//!
//! Fetches firm websites, fills in their profiles and optionally hands the
//! crawled text to the pipeline as a `web_page` document.
//!
//! A run fetches the homepage plus a few same-host subpages whose paths look
//! like "about", "team" or "portfolio" pages, extracts profile facts from the
//! combined visible text and overwrites the stored profile field by field.

#![warn(missing_docs)]

mod config;
mod enrich;
mod error;
mod fetch;
pub mod html;

pub use config::CrawlerConfig;
pub use enrich::{EnrichmentReport, FirmEnricher};
pub use error::CrawlError;
pub use fetch::{parse_site_url, Page, PageFetcher};
