use std::sync::Arc;

use client::{ApiClient, Method};
use config::ApiConfig;
use errors::{ApiErrorKind, AuthErrorCode};
use jt_core::SessionHandle;
use serde_json::json;
use testing::{ScriptedSessionProvider, principal};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.uri(),
        timeout_seconds: Some(5),
    })
    .unwrap()
}

fn signed_in() -> (Arc<ScriptedSessionProvider>, SessionHandle) {
    let provider = Arc::new(ScriptedSessionProvider::signed_in(principal(
        "u1",
        "ada@example.com",
    )));
    let session = SessionHandle::new(provider.clone());
    (provider, session)
}

#[tokio::test]
async fn test_bearer_token_is_fetched_per_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(header("Authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let (provider, session) = signed_in();

    for _ in 0..2 {
        let url = api.url(&["api", "notes"]);
        let body = api.send(&session, Method::GET, url, None).await.unwrap();
        assert_eq!(body, json!([]));
    }
    assert_eq!(provider.token_requests(), 2);
}

#[tokio::test]
async fn test_anonymous_call_has_no_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "UP"})))
        .mount(&server)
        .await;

    let api = api(&server);
    let body = api
        .send(&SessionHandle::anonymous(), Method::GET, api.url(&["health"]), None)
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "UP"}));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_signed_out_provider_sends_no_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&server)
        .await;

    let api = api(&server);
    let provider = Arc::new(ScriptedSessionProvider::signed_out());
    let session = SessionHandle::new(provider.clone());

    let err = api
        .send(&session, Method::GET, api.url(&["api", "notes"]), None)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.message(), "Unauthorized");
    assert_eq!(provider.token_requests(), 0);
}

#[tokio::test]
async fn test_json_body_is_sent() {
    let server = MockServer::start().await;
    let payload = json!({"title": "Groceries", "content": "milk, eggs", "isFavorite": false});
    Mock::given(method("POST"))
        .and(path("/api/notes"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let api = api(&server);
    let (_provider, session) = signed_in();
    let body = api
        .send(&session, Method::POST, api.url(&["api", "notes"]), Some(&payload))
        .await
        .unwrap();
    assert_eq!(body, json!({"id": 1}));
}

#[tokio::test]
async fn test_server_error_message_precedence() {
    let server = MockServer::start().await;
    Mock::given(path("/message"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Note not found"})))
        .mount(&server)
        .await;
    Mock::given(path("/raw"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Title is required"))
        .mount(&server)
        .await;
    Mock::given(path("/empty"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = api(&server);
    let session = SessionHandle::anonymous();

    let cases = [
        ("message", 404, "Note not found"),
        ("raw", 400, "Title is required"),
        ("empty", 500, "An error occurred"),
    ];
    for (segment, status, message) in cases {
        let err = api
            .send(&session, Method::GET, api.url(&[segment]), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Server);
        assert_eq!(err.status(), Some(status));
        assert_eq!(err.message(), message);
    }
}

#[tokio::test]
async fn test_unreachable_server_is_no_response() {
    let server = MockServer::start().await;
    let api = api(&server);
    drop(server);

    let err = api
        .send(
            &SessionHandle::anonymous(),
            Method::GET,
            api.url(&["api", "notes"]),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::NoResponse);
    assert_eq!(err.message(), "Unable to connect to server.");
}

#[tokio::test]
async fn test_token_failure_is_dispatch_error() {
    let server = MockServer::start().await;
    let api = api(&server);
    let (provider, session) = signed_in();
    provider.fail_tokens(Some(AuthErrorCode::UserTokenExpired));

    let err = api
        .send(&session, Method::GET, api.url(&["api", "notes"]), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ApiErrorKind::Dispatch);
    assert!(err.message().contains("scripted token failure"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_success_bodies_decode() {
    let server = MockServer::start().await;
    Mock::given(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(path("/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let api = api(&server);
    let session = SessionHandle::anonymous();
    assert_eq!(
        api.send(&session, Method::DELETE, api.url(&["empty"]), None)
            .await
            .unwrap(),
        serde_json::Value::Null
    );
    assert_eq!(
        api.send(&session, Method::GET, api.url(&["text"]), None)
            .await
            .unwrap(),
        json!("OK")
    );
}
