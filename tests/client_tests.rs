//! Instrumented client tests
//!
//! Runs the upstream client against a mock Gumroad API and checks what lands
//! in the call history

use futures::future::join_all;
use gumdash::services::{CallHistory, CallKind, UpstreamClient, UpstreamError};
use httpmock::prelude::*;
use reqwest::Method;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TOKEN: &str = "test-token-abcdef123456";

fn client(base_url: &str, history: Arc<CallHistory>) -> UpstreamClient {
    UpstreamClient::with_timeouts(base_url, Duration::from_secs(5), Duration::from_secs(5), history)
        .expect("Failed to create client")
}

/// Address that refuses connections
fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_105_calls_keep_newest_100() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/calls/");
            then.status(200).body(r#"{"success":true}"#);
        })
        .await;

    let history = Arc::new(CallHistory::new(100));
    let client = client(&server.base_url(), history.clone());

    for n in 1..=105 {
        client
            .fetch(&server.url(format!("/calls/{}", n)), TOKEN)
            .await
            .unwrap();
    }

    let snapshot = history.snapshot();
    assert_eq!(snapshot.len(), 100);
    assert_eq!(snapshot[0].url, server.url("/calls/105"));
    assert_eq!(snapshot[99].url, server.url("/calls/6"));
    assert!(snapshot.iter().all(|r| r.status == 200 && r.error.is_empty()));
}

#[tokio::test]
async fn test_connection_refused_records_status_zero() {
    let history = Arc::new(CallHistory::default());
    let client = client(&refused_base_url(), history.clone());

    let err = client.list_products(TOKEN).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Transport { .. }));
    assert!(!err.is_timeout());

    let records = history.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 0);
    assert!(!records[0].error.is_empty());
    assert!(records[0].response_body.is_empty());
    assert_eq!(records[0].url, client.products_url());
}

#[tokio::test]
async fn test_fetch_timeout_records_one_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/products");
            then.status(200).delay(Duration::from_secs(3));
        })
        .await;

    let history = Arc::new(CallHistory::default());
    let client = UpstreamClient::with_timeouts(
        &server.base_url(),
        Duration::from_millis(300),
        Duration::from_secs(5),
        history.clone(),
    )
    .unwrap();

    let started = Instant::now();
    let err = client.list_products(TOKEN).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(err.is_timeout());
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(2000));

    let records = history.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, 0);
    assert!(records[0].error.contains("timed out"));
    assert!(records[0].duration >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_unknown_license_is_business_failure_not_transport_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/licenses/verify");
            then.status(200)
                .body(r#"{"success":false,"message":"That license does not exist for the provided product."}"#);
        })
        .await;

    let history = Arc::new(CallHistory::default());
    let client = client(&server.base_url(), history.clone());

    let validation = client
        .verify_license(TOKEN, "no-such-product", "NO-SUCH-KEY")
        .await
        .unwrap();
    assert!(!validation.success);
    assert!(!validation.message.unwrap_or_default().is_empty());

    let record = &history.snapshot()[0];
    assert_eq!(record.status, 200);
    assert!(record.error.is_empty());
    assert!(record.request_body.contains("increment_uses_count=false"));
}

#[tokio::test]
async fn test_unknown_license_with_404_still_parses() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/licenses/verify");
            then.status(404).body(r#"{"success":false}"#);
        })
        .await;

    let history = Arc::new(CallHistory::default());
    let client = client(&server.base_url(), history.clone());

    let validation = client.verify_license(TOKEN, "p", "k").await.unwrap();
    assert!(!validation.success);
    assert_eq!(validation.message.as_deref(), Some("Invalid license key"));
    assert_eq!(history.snapshot()[0].status, 404);
}

#[tokio::test]
async fn test_execute_returns_raw_non_success_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/products");
            then.status(503).body("maintenance");
        })
        .await;

    let history = Arc::new(CallHistory::default());
    let client = client(&server.base_url(), history.clone());

    let response = client
        .execute(Method::GET, &client.products_url(), None, TOKEN, CallKind::Fetch)
        .await
        .unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.body, "maintenance");

    let record = &history.snapshot()[0];
    assert_eq!(record.status, 503);
    assert!(record.error.is_empty());
    assert!(record.headers["Authorization"].ends_with("3456"));
    assert!(!record.headers["Authorization"].contains(TOKEN));
}

#[tokio::test]
async fn test_status_error_truncates_body() {
    let server = MockServer::start_async().await;
    let long_body = "x".repeat(1000);
    server
        .mock_async(|when, then| {
            when.method(GET).path("/products");
            then.status(502).body(long_body.clone());
        })
        .await;

    let history = Arc::new(CallHistory::default());
    let client = client(&server.base_url(), history.clone());

    let message = client.list_products(TOKEN).await.unwrap_err().to_string();
    assert!(message.starts_with("API request failed with status 502: "));
    assert!(message.len() < 400);

    // The history keeps the full body
    assert_eq!(history.snapshot()[0].response_body.len(), 1000);
}

#[tokio::test]
async fn test_concurrent_calls_each_recorded_once() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/sales");
            then.status(200)
                .body(r#"{"success":true,"sales":[]}"#)
                .delay(Duration::from_millis(20));
        })
        .await;

    let history = Arc::new(CallHistory::new(100));
    let client = client(&server.base_url(), history.clone());

    let calls = (0..40).map(|n| {
        let client = client.clone();
        async move { client.list_sales(TOKEN, &format!("product-{}", n)).await }
    });
    let results = join_all(calls).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let snapshot = history.snapshot();
    assert_eq!(snapshot.len(), 40);

    let mut urls: Vec<&str> = snapshot.iter().map(|r| r.url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), 40);
}

#[tokio::test]
async fn test_record_is_stamped_at_completion() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/products");
            then.status(200)
                .body(r#"{"success":true,"products":[]}"#)
                .delay(Duration::from_millis(250));
        })
        .await;

    let history = Arc::new(CallHistory::default());
    let client = client(&server.base_url(), history.clone());

    let before = chrono::Utc::now();
    client.list_products(TOKEN).await.unwrap();

    let record = &history.snapshot()[0];
    assert!(record.duration >= Duration::from_millis(250));
    assert!(record.timestamp - before >= chrono::Duration::milliseconds(250));
}
