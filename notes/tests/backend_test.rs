use std::sync::Arc;

use client::NotesClient;
use config::ApiConfig;
use jt_core::SessionHandle;
use notes::NoteCollection;
use serde_json::json;
use testing::{ScriptedDialog, ScriptedSessionProvider, note_json, principal};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collection(base_url: String) -> NoteCollection {
    let api = NotesClient::new(&ApiConfig {
        base_url,
        timeout_seconds: Some(5),
    })
    .unwrap();
    let provider = Arc::new(ScriptedSessionProvider::signed_in(principal(
        "u1",
        "ada@example.com",
    )));
    NoteCollection::new(
        Arc::new(api),
        Arc::new(ScriptedDialog::new()),
        SessionHandle::new(provider),
    )
}

#[tokio::test]
async fn test_toggle_issues_favorites_then_all() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes/favorites"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([note_json(2, "Starred", "", true)])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            note_json(2, "Starred", "", true),
            note_json(1, "Plain", "", false)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let notes = collection(server.uri());
    notes.toggle_favorites_view().await.unwrap();
    assert_eq!(notes.notes().len(), 1);
    notes.toggle_favorites_view().await.unwrap();
    assert_eq!(notes.notes().len(), 2);

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(paths, vec!["/api/notes/favorites", "/api/notes"]);
}

#[tokio::test]
async fn test_groceries_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notes"))
        .and(header("Authorization", "Bearer token-1"))
        .and(body_json(json!({
            "title": "Groceries",
            "content": "milk, eggs",
            "isFavorite": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "n1",
            "title": "Groceries",
            "content": "milk, eggs",
            "isFavorite": false,
            "createdAt": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/notes/n1"))
        .and(body_json(json!({
            "title": "Groceries",
            "content": "milk, eggs",
            "isFavorite": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "n1",
            "title": "Groceries",
            "content": "milk, eggs",
            "isFavorite": true,
            "createdAt": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notes = collection(server.uri());
    notes.new_note();
    notes.set_title("Groceries");
    notes.set_content("milk, eggs");
    let created = notes.save().await.unwrap();
    assert_eq!(notes.notes().first(), Some(&created));
    assert_eq!(created.id.as_str(), "n1");

    notes.set_favorite(true);
    let updated = notes.save().await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(notes.notes(), vec![updated]);
}

#[tokio::test]
async fn test_server_message_reaches_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "Access denied"})),
        )
        .mount(&server)
        .await;

    let notes = collection(server.uri());
    notes.load().await.unwrap_err();
    assert_eq!(
        notes.error().as_deref(),
        Some("Failed to load notes: Access denied")
    );
}

#[tokio::test]
async fn test_no_connectivity_message() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let notes = collection(uri);
    notes.load().await.unwrap_err();
    assert_eq!(
        notes.error().as_deref(),
        Some("Failed to load notes: Unable to connect to server.")
    );
}
