//! HTTP result source against a mock query endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use infill::{
    FetchError, HtmlRenderer, Query, ResultSource, SearchLoader, Settings,
    HttpResultSource,
};

fn result(url: &str) -> serde_json::Value {
    json!({
        "url": url,
        "title": "Title",
        "description": "Description",
        "engines": ["duckduckgo", "google"],
        "cached": true
    })
}

fn source_for(server: &MockServer) -> HttpResultSource {
    HttpResultSource::new(&server.uri(), "infill-test", Duration::from_secs(5))
}

#[tokio::test]
async fn test_offset_addressing_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("tab", "images"))
        .and(query_param("query", "sunset"))
        .and(query_param("start", "50"))
        .and(query_param("count", "50"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"hasMore": true, "Images": [result("a")]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = source_for(&server)
        .fetch_page(&Query::from_parts("sunset", Some("images")), 50, 50)
        .await
        .unwrap();

    assert!(page.has_more);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].url, "a");
    assert!(page.results[0].cached);
}

#[tokio::test]
async fn test_session_addressing_request_shape() {
    let server = MockServer::start().await;
    let id = uuid::Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("id", id.to_string()))
        .and(query_param("from", "10"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"hasMore": false, "General": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let source = source_for(&server).with_session(id);
    let page = source
        .fetch_page(&Query::from_parts("rust", None), 10, 10)
        .await
        .unwrap();
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_bare_array_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([result("a"), result("b")])))
        .mount(&server)
        .await;

    let page = source_for(&server)
        .fetch_page(&Query::from_parts("rust", None), 0, 10)
        .await
        .unwrap();
    assert_eq!(page.results.len(), 2);
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_non_success_status_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_page(&Query::from_parts("rust", None), 0, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status(status) if status.as_u16() == 500));
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = source_for(&server)
        .fetch_page(&Query::from_parts("rust", None), 0, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_unknown_variant_degrades_to_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"hasMore": true, "Videos": [result("a")]})),
        )
        .mount(&server)
        .await;

    let page = source_for(&server)
        .fetch_page(&Query::from_parts("rust", None), 0, 10)
        .await
        .unwrap();
    assert!(page.results.is_empty());
    assert!(page.has_more);
}

// A whole session over HTTP: a full first page, then a terminal page.
#[tokio::test]
async fn test_loader_drives_paginated_endpoint() {
    let server = MockServer::start().await;

    let first: Vec<_> = (0..10).map(|i| result(&format!("first/{}", i))).collect();
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("start", "0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"hasMore": true, "General": first})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let second: Vec<_> = (0..3).map(|i| result(&format!("second/{}", i))).collect();
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("start", "10"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"hasMore": false, "General": second})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        poll_interval_ms: 5,
        error_retry_ms: 10,
        ..Default::default()
    };
    let loader = SearchLoader::new(
        Query::from_parts("rust", None),
        source_for(&server),
        HtmlRenderer,
        settings,
    );

    loader.start().await;
    tokio::time::timeout(Duration::from_secs(5), loader.wait_until_stopped())
        .await
        .expect("loader did not stop in time");

    let snapshot = loader.snapshot().await;
    assert_eq!(snapshot.cursor, 13);
    assert_eq!(snapshot.filled, 13);
}
