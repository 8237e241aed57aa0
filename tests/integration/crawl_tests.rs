//! End-to-end harvests against a mock news site

use chrono::Utc;
use std::path::Path;
use tag_harvest::config::{parse_config, Config};
use tag_harvest::output::{ArticleDocument, JsonFileSink, OutputError, OutputResult, ResultSink};
use tag_harvest::{harvest, HarvestError, StopReason};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_dir: &Path) -> Config {
    parse_config(&format!(
        r#"
[crawler]
max-concurrent-articles = 4
page-delay = 0
max-retries = 1
retry-delay = 10

[site]
name = "Mock News"
base-url = "{}"
listing-path = "/tag/{{category}}?page={{page}}"
list-selector = "div.article__list a.article__link"
content-selector = ".read__content"
date-selector = ".read__time"
title-selector = ".read__title"

[http]
user-agent = "TestHarvester/1.0"
timeout-secs = 5

[output]
directory = "{}"
"#,
        base_url,
        output_dir.display()
    ))
    .expect("Failed to parse test config")
}

fn listing_html(base_url: &str, slugs: &[&str]) -> String {
    let items: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<div class="article__list"><a class="article__link" href="{}/read/{}">Listing headline for {}</a></div>"#,
                base_url, slug, slug
            )
        })
        .collect();
    format!(r#"<html><body><div class="latest">{}</div></body></html>"#, items)
}

fn article_html(slug: &str) -> String {
    format!(
        r#"<html><body>
            <h1 class="read__title">Full headline for {slug}</h1>
            <div class="read__time">Kompas.com - 01/05/2024, 10:00 WIB</div>
            <div class="read__content">
                <p>First paragraph of {slug}.</p>
                <p>Second paragraph of {slug}.</p>
            </div>
        </body></html>"#
    )
}

async fn mount_listing(server: &MockServer, page: u32, slugs: &[&str], expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/tag/ekonomi"))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(&server.uri(), slugs))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_article(server: &MockServer, slug: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/read/{}", slug).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_html(slug))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn read_document(path: &Path) -> ArticleDocument {
    let content = std::fs::read_to_string(path).expect("Output file missing");
    serde_json::from_str(&content).expect("Output is not a valid document")
}

/// Sink whose writes always fail
struct FailingSink;

impl ResultSink for FailingSink {
    fn flush(&self, _document: &ArticleDocument) -> OutputResult<()> {
        Err(OutputError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

#[tokio::test]
async fn test_harvest_writes_json_document() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_listing(&mock_server, 1, &["a", "b", "a"], 1).await;
    mount_listing(&mock_server, 2, &[], 1).await;
    mount_listing(&mock_server, 3, &["c"], 0).await;
    mount_article(&mock_server, "a", 1).await;
    mount_article(&mock_server, "b", 1).await;
    mount_article(&mock_server, "c", 0).await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let sink = JsonFileSink::for_run(output.path(), "ekonomi", Utc::now());

    let report = harvest(
        &config,
        Some("deadbeef"),
        "ekonomi",
        &sink,
        CancellationToken::new(),
    )
    .await
    .expect("Harvest failed to start");

    assert!(report.is_written());
    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.duplicates_skipped, 1);

    let document = read_document(sink.path());
    assert_eq!(document.total_articles, 2);
    assert_eq!(document.articles.len(), 2);
    assert_eq!(document.category, "ekonomi");
    assert_eq!(document.source, "Mock News");
    assert_eq!(document.config_hash.as_deref(), Some("deadbeef"));
    assert_eq!(document.stop_reason, StopReason::Exhausted);

    let first = &document.articles[0];
    assert_eq!(first.url, format!("{}/read/a", mock_server.uri()));
    assert_eq!(first.title, "Full headline for a");
    assert_eq!(
        first.content,
        "First paragraph of a. Second paragraph of a."
    );
    assert_eq!(first.date, "Kompas.com - 01/05/2024, 10:00 WIB");
    assert_eq!(first.category, "ekonomi");

    // The raw JSON uses the documented field names
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(sink.path()).unwrap()).unwrap();
    assert_eq!(raw["total_articles"], 2);
    assert!(raw["articles"][1]["article_url"]
        .as_str()
        .unwrap()
        .ends_with("/read/b"));
}

#[tokio::test]
async fn test_article_failure_keeps_degraded_record() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_listing(&mock_server, 1, &["ok", "broken"], 1).await;
    mount_listing(&mock_server, 2, &["next"], 1).await;
    mount_listing(&mock_server, 3, &[], 1).await;
    mount_article(&mock_server, "ok", 1).await;
    mount_article(&mock_server, "next", 1).await;

    // Transient failure: first attempt plus one retry
    Mock::given(method("GET"))
        .and(path("/read/broken"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let sink = JsonFileSink::for_run(output.path(), "ekonomi", Utc::now());

    let report = harvest(&config, None, "ekonomi", &sink, CancellationToken::new())
        .await
        .unwrap();

    let document = read_document(sink.path());
    assert_eq!(document.total_articles, 3);

    let broken = document
        .articles
        .iter()
        .find(|a| a.url.ends_with("/read/broken"))
        .expect("Degraded record was dropped");
    assert_eq!(broken.content, "");
    assert_eq!(broken.date, "");
    assert_eq!(broken.title, "Listing headline for broken");

    assert_eq!(report.stats.fetch_failures, 1);
    assert_eq!(report.stats.degraded_records, 1);
    assert!(document.config_hash.is_none());
}

#[tokio::test]
async fn test_listing_failure_flushes_collected() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_listing(&mock_server, 1, &["a"], 1).await;
    mount_article(&mock_server, "a", 1).await;

    Mock::given(method("GET"))
        .and(path("/tag/ekonomi"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let sink = JsonFileSink::for_run(output.path(), "ekonomi", Utc::now());

    let report = harvest(&config, None, "ekonomi", &sink, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.document.stop_reason, StopReason::ListingFailed);
    let document = read_document(sink.path());
    assert_eq!(document.total_articles, 1);
    assert_eq!(document.stop_reason, StopReason::ListingFailed);
}

#[tokio::test]
async fn test_cancelled_before_start_writes_empty_document() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_listing(&mock_server, 1, &["a"], 0).await;

    let config = create_test_config(&mock_server.uri(), output.path());
    let sink = JsonFileSink::for_run(output.path(), "ekonomi", Utc::now());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = harvest(&config, None, "ekonomi", &sink, cancel)
        .await
        .unwrap();

    assert!(report.is_written());
    let document = read_document(sink.path());
    assert_eq!(document.total_articles, 0);
    assert_eq!(document.stop_reason, StopReason::Cancelled);
}

#[tokio::test]
async fn test_unwritable_output_aborts_before_fetching() {
    let mock_server = MockServer::start().await;
    let scratch = TempDir::new().unwrap();
    let blocker = scratch.path().join("not-a-dir");
    std::fs::write(&blocker, "file in the way").unwrap();

    mount_listing(&mock_server, 1, &["a"], 0).await;

    let config = create_test_config(&mock_server.uri(), &blocker);
    let sink = JsonFileSink::for_run(&blocker, "ekonomi", Utc::now());

    let result = harvest(&config, None, "ekonomi", &sink, CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(HarvestError::Output(OutputError::NotWritable { .. }))
    ));
}

#[tokio::test]
async fn test_write_error_keeps_records() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_listing(&mock_server, 1, &["a", "b"], 1).await;
    mount_listing(&mock_server, 2, &[], 1).await;
    mount_article(&mock_server, "a", 1).await;
    mount_article(&mock_server, "b", 1).await;

    let config = create_test_config(&mock_server.uri(), output.path());

    let report = harvest(&config, None, "ekonomi", &FailingSink, CancellationToken::new())
        .await
        .unwrap();

    assert!(!report.is_written());
    assert!(matches!(report.write_error, Some(OutputError::Io(_))));
    assert_eq!(report.document.total_articles, 2);
    assert_eq!(report.document.articles.len(), 2);
}

#[tokio::test]
async fn test_invalid_category_rejected() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), output.path());
    let sink = JsonFileSink::for_run(output.path(), "bad", Utc::now());

    let result = harvest(&config, None, "ekonomi/../admin", &sink, CancellationToken::new()).await;

    assert!(matches!(result, Err(HarvestError::InvalidCategory { .. })));
    assert!(!sink.path().exists());
}
