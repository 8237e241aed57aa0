//! HTTP fetcher behaviour against a live mock server

use std::collections::BTreeMap;
use std::time::Duration;
use tag_harvest::config::HttpConfig;
use tag_harvest::crawler::{FetchErrorKind, HttpFetcher, PageFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_config() -> HttpConfig {
    let mut headers = BTreeMap::new();
    headers.insert("accept-language".to_string(), "id-ID,id;q=0.9".to_string());
    HttpConfig {
        user_agent: "TestHarvester/1.0".to_string(),
        timeout_secs: 5,
        connect_timeout_secs: 2,
        headers,
    }
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/read/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Hello</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&http_config()).unwrap();
    let body = fetcher
        .fetch(&format!("{}/read/1", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<html><body>Hello</body></html>");
}

#[tokio::test]
async fn test_fetch_sends_configured_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/read/1"))
        .and(header("user-agent", "TestHarvester/1.0"))
        .and(header("accept-language", "id-ID,id;q=0.9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&http_config()).unwrap();
    let result = fetcher.fetch(&format!("{}/read/1", mock_server.uri())).await;

    assert_eq!(result.unwrap(), "ok");
}

#[tokio::test]
async fn test_fetch_not_found_is_permanent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&http_config()).unwrap();
    let url = format!("{}/missing", mock_server.uri());
    let err = fetcher.fetch(&url).await.unwrap_err();

    assert_eq!(err.kind, FetchErrorKind::Status(404));
    assert_eq!(err.url, url);
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_fetch_server_error_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&http_config()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/busy", mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FetchErrorKind::Status(503));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = HttpConfig {
        timeout_secs: 1,
        ..http_config()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();
    let err = fetcher
        .fetch(&format!("{}/slow", mock_server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FetchErrorKind::Timeout);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Nothing listens on port 1
    let fetcher = HttpFetcher::new(&http_config()).unwrap();
    let err = fetcher
        .fetch("http://127.0.0.1:1/gone")
        .await
        .unwrap_err();

    assert_eq!(err.kind, FetchErrorKind::Connect);
    assert!(err.is_transient());
}
