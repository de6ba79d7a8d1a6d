//! Integration tests for the resilient transport
//!
//! These tests verify retry behavior against a real HTTP server:
//! - Retryable statuses are retried until the budget runs out
//! - The caller only ever sees the final response
//! - The identity header stays fixed for the lifetime of a session

use std::time::Duration;

use egress_gate::error_handling::TransportFailure;
use egress_gate::transport::{
    create_session, request_with_session_options, RequestOptions, SessionOptions,
};
use reqwest::{Method, StatusCode};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Session options with a short backoff so tests stay fast
fn fast_session(retries: u32) -> SessionOptions {
    SessionOptions {
        retries,
        backoff_factor: 0.01,
        timeout: Duration::from_secs(5),
        randomize_identity: true,
    }
}

#[tokio::test]
async fn test_three_503s_then_200_surfaces_only_the_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .with_priority(1)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let session = create_session(fast_session(3)).expect("session should build");
    let url = format!("{}/flaky", server.uri());
    let response = session
        .get(&url, &RequestOptions::default())
        .await
        .expect("retries should hide the 503s");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_persistent_503_exhausts_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let url = format!("{}/down", server.uri());
    let err = request_with_session_options(
        &fast_session(2),
        Method::GET,
        &url,
        RequestOptions::default(),
    )
    .await
    .expect_err("a 503 that never clears should fail");

    assert_eq!(err.method, Method::GET);
    assert_eq!(err.url, url);
    assert!(matches!(
        err.cause,
        TransportFailure::StatusExhausted(StatusCode::SERVICE_UNAVAILABLE)
    ));
}

#[tokio::test]
async fn test_post_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/submit", server.uri());
    let response = request_with_session_options(
        &fast_session(1),
        Method::POST,
        &url,
        RequestOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_delete_gets_a_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/resource"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/resource", server.uri());
    let response = request_with_session_options(
        &fast_session(3),
        Method::DELETE,
        &url,
        RequestOptions::default(),
    )
    .await
    .expect("non-retryable methods return the response as-is");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_identity_is_fixed_across_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let session = create_session(fast_session(2)).unwrap();
    let identity = session.identity().expect("identity should be set");
    let url = format!("{}/ua", server.uri());
    session
        .get(&url, &RequestOptions::default())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    for request in requests {
        let sent = request
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert_eq!(sent, identity);
    }
}
