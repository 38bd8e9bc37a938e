//! Enrichment tests against a local fake website

use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use dealsignal_crawler::{CrawlError, CrawlerConfig, FirmEnricher};
use dealsignal_domain::traits::{ProfileStore, SignalStore};
use dealsignal_domain::{FirmProfile, ProcessingStatus, SourceKind};
use dealsignal_extractor::ExtractorConfig;
use dealsignal_pipeline::{shared, SharedStore};
use dealsignal_store::SqliteStore;
use tokio::net::TcpListener;

const HOME: &str = r#"<html><head>
<title>Northwind Ventures | Seed Fund</title>
<meta name="description" content="Early-stage fund for fintech founders.">
</head><body>
<nav>
  <a href="/about">About</a>
  <a href="/team">Team</a>
  <a href="/portfolio">Portfolio</a>
  <a href="/blog">Blog</a>
  <a href="https://www.linkedin.com/company/northwind-ventures/">LinkedIn</a>
</nav>
<p>We back fintech and climate founders at the pre-seed and seed stages.</p>
</body></html>"#;

const ABOUT: &str = r#"<html><body>
<h1>About</h1>
<p>Northwind Ventures is based in Austin, TX. Founded in 2014, we manage $300 million in AUM
and write checks of $250K to $1M. Reach us at team@northwind.vc.</p>
</body></html>"#;

const PORTFOLIO: &str = "<html><body><p>Our portfolio companies are building the \
    future of payments in North America, a market expected to reach $2 trillion by 2030.</p>\
    </body></html>";

async fn spawn_site() -> String {
    let app = Router::new()
        .route("/", get(|| async { Html(HOME) }))
        .route("/about", get(|| async { Html(ABOUT) }))
        .route("/team", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/portfolio", get(|| async { Html(PORTFOLIO) }))
        .route("/blog", get(|| async { Html("<p>blog</p>") }))
        .route("/empty", get(|| async { Html("<html><head><title>Blank</title></head></html>") }))
        .route("/gone", get(|| async { StatusCode::NOT_FOUND }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn store() -> SharedStore<SqliteStore> {
    shared(SqliteStore::new(":memory:").unwrap())
}

fn enricher(store: &SharedStore<SqliteStore>, config: CrawlerConfig) -> FirmEnricher<SqliteStore> {
    FirmEnricher::new(store.clone(), config, &ExtractorConfig::default()).unwrap()
}

#[tokio::test]
async fn test_enrich_fills_profile_from_home_and_subpages() {
    let base = spawn_site().await;
    let store = store();
    let report = enricher(&store, CrawlerConfig::default())
        .enrich("northwind", &base)
        .await
        .unwrap();

    // homepage, about and portfolio; team fails; blog is not followed
    assert_eq!(report.pages_fetched.len(), 3);
    assert_eq!(report.pages_failed, 1);
    assert!(!report.pages_fetched.iter().any(|p| p.ends_with("/blog")));

    let profile = store.lock().unwrap().get_profile("northwind").unwrap().unwrap();
    assert_eq!(profile, report.profile);
    assert_eq!(profile.name.as_deref(), Some("Northwind Ventures"));
    assert_eq!(
        profile.description.as_deref(),
        Some("Early-stage fund for fintech founders.")
    );
    assert_eq!(profile.location.as_deref(), Some("Austin, TX"));
    assert_eq!(profile.founded_year, Some(2014));
    assert_eq!(profile.aum.as_deref(), Some("$300M"));
    assert_eq!(profile.check_size.as_deref(), Some("$250K-$1M"));
    assert_eq!(profile.emails, vec!["team@northwind.vc"]);
    assert!(profile.focus_sectors.contains(&"Fintech".to_string()));
    assert_eq!(profile.stages, vec!["Pre-Seed", "Seed"]);
    assert!(profile.website.as_deref().unwrap().starts_with(&base));
    assert!(profile.updated_at.is_some());
}

#[tokio::test]
async fn test_enrich_ingests_web_page_document() {
    let base = spawn_site().await;
    let store = store();
    let report = enricher(&store, CrawlerConfig::default())
        .enrich("northwind", &base)
        .await
        .unwrap();

    let id = report.document_id.expect("crawled text should be ingested");
    let store = store.lock().unwrap();
    let document = store.get_document(id).unwrap().unwrap();
    assert_eq!(document.kind, SourceKind::WebPage);
    assert_eq!(document.status, ProcessingStatus::Pending);
    assert_eq!(document.title, "Northwind Ventures | Seed Fund");
    assert!((document.source_weight.value() - 0.6).abs() < 1e-12);

    let chunks = store.get_chunks(id).unwrap();
    assert!(chunks.iter().any(|c| c.content.contains("$2 trillion by 2030")));
}

#[tokio::test]
async fn test_enrich_without_ingest() {
    let base = spawn_site().await;
    let store = store();
    let config = CrawlerConfig {
        ingest_pages: false,
        max_about_pages: 1,
        ..Default::default()
    };
    let report = enricher(&store, config).enrich("northwind", &base).await.unwrap();

    assert_eq!(report.document_id, None);
    assert_eq!(report.pages_fetched.len(), 2);
    let pending = store
        .lock()
        .unwrap()
        .documents_with_status(ProcessingStatus::Pending)
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_enrich_overwrites_existing_fields() {
    let base = spawn_site().await;
    let store = store();
    let mut existing = FirmProfile::new("northwind");
    existing.aum = Some("$9B".to_string());
    existing.stages = vec!["Growth".to_string()];
    existing.twitter_url = Some("https://x.com/northwind".to_string());
    store.lock().unwrap().save_profile(&existing).unwrap();

    let report = enricher(&store, CrawlerConfig::default())
        .enrich("northwind", &base)
        .await
        .unwrap();

    assert_eq!(report.profile.aum.as_deref(), Some("$300M"));
    assert_eq!(report.profile.stages, vec!["Pre-Seed", "Seed"]);
    // not found on this run, so kept
    assert_eq!(report.profile.twitter_url.as_deref(), Some("https://x.com/northwind"));
}

#[tokio::test]
async fn test_homepage_error_is_reported() {
    let base = spawn_site().await;
    let store = store();
    let result = enricher(&store, CrawlerConfig::default())
        .enrich("northwind", &format!("{}/gone", base))
        .await;

    assert!(matches!(result, Err(CrawlError::Status { status: 404, .. })));
    assert!(store.lock().unwrap().get_profile("northwind").unwrap().is_none());
}

#[tokio::test]
async fn test_page_without_text_is_not_ingested() {
    let base = spawn_site().await;
    let store = store();
    let report = enricher(&store, CrawlerConfig::default())
        .enrich("blank", &format!("{}/empty", base))
        .await
        .unwrap();

    assert_eq!(report.pages_fetched.len(), 1);
    assert_eq!(report.profile.name.as_deref(), Some("Blank"));
    assert_eq!(report.document_id, None);
}
