use std::sync::Arc;

use errors::AuthErrorCode;
use identity::{CredentialGate, FirebaseSessionProvider, GateMode, SessionStore};
use jt_core::{SessionProvider, SessionState};
use tempfile::TempDir;
use testing::{FirebaseMock, IDP_PATH, SIGN_IN_PATH, SIGN_UP_PATH, TOKEN_PATH};

fn provider(mock: &FirebaseMock, dir: &TempDir) -> FirebaseSessionProvider {
    FirebaseSessionProvider::new(mock.identity_config(Some(dir.path().join("session.json"))))
        .unwrap()
}

#[tokio::test]
async fn test_sign_in_caches_token_and_persists_session() {
    let mock = FirebaseMock::start().await;
    let dir = TempDir::new().unwrap();
    mock.mount_sign_in("u1", "ada@example.com", 3600).await;

    let provider = provider(&mock, &dir);
    let mut states = provider.subscribe();

    let principal = provider.sign_in("ada@example.com", "secret").await.unwrap();
    assert_eq!(principal.uid, "u1");
    assert_eq!(principal.email.as_deref(), Some("ada@example.com"));

    assert!(states.has_changed().unwrap());
    assert_eq!(
        *states.borrow_and_update(),
        SessionState::SignedIn(principal.clone())
    );

    let token = provider.id_token().await.unwrap();
    assert_eq!(token.expose(), "id-u1");
    assert_eq!(mock.hits(TOKEN_PATH).await, 0);

    let stored = SessionStore::new(dir.path().join("session.json"))
        .load()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.principal, principal);
    assert_eq!(stored.refresh_token, "refresh-u1");
}

#[tokio::test]
async fn test_sign_up_with_existing_email_maps_code() {
    let mock = FirebaseMock::start().await;
    let dir = TempDir::new().unwrap();
    mock.mount_error(SIGN_UP_PATH, "EMAIL_EXISTS").await;

    let provider = provider(&mock, &dir);
    let err = provider
        .sign_up("ada@example.com", "secret")
        .await
        .unwrap_err();

    assert_eq!(err.code, AuthErrorCode::EmailAlreadyInUse);
    assert_eq!(
        err.user_message(),
        "An account with this email already exists. Please sign in instead."
    );
    assert!(provider.current_principal().is_none());
}

#[tokio::test]
async fn test_expiring_token_is_refreshed_once() {
    let mock = FirebaseMock::start().await;
    let dir = TempDir::new().unwrap();
    // Inside the default 300s refresh margin.
    mock.mount_sign_in("u1", "ada@example.com", 60).await;
    mock.mount_refresh("id-fresh", "refresh-u1", 3600).await;

    let provider = provider(&mock, &dir);
    provider.sign_in("ada@example.com", "secret").await.unwrap();

    assert_eq!(provider.id_token().await.unwrap().expose(), "id-fresh");
    assert_eq!(provider.id_token().await.unwrap().expose(), "id-fresh");
    assert_eq!(mock.hits(TOKEN_PATH).await, 1);
}

#[tokio::test]
async fn test_rotated_refresh_token_is_persisted() {
    let mock = FirebaseMock::start().await;
    let dir = TempDir::new().unwrap();
    mock.mount_sign_in("u1", "ada@example.com", 0).await;
    mock.mount_refresh("id-fresh", "refresh-rotated", 3600).await;

    let provider = provider(&mock, &dir);
    provider.sign_in("ada@example.com", "secret").await.unwrap();
    provider.id_token().await.unwrap();

    let stored = SessionStore::new(dir.path().join("session.json"))
        .load()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.refresh_token, "refresh-rotated");
}

#[tokio::test]
async fn test_restore_uses_persisted_refresh_token() {
    let mock = FirebaseMock::start().await;
    let dir = TempDir::new().unwrap();
    mock.mount_sign_in("u1", "ada@example.com", 3600).await;
    mock.mount_refresh("id-restored", "refresh-u1", 3600).await;

    provider(&mock, &dir)
        .sign_in("ada@example.com", "secret")
        .await
        .unwrap();

    let restarted = provider(&mock, &dir);
    assert_eq!(*restarted.subscribe().borrow(), SessionState::Unknown);

    let state = restarted.restore().await;
    assert_eq!(state.principal().map(|p| p.uid.as_str()), Some("u1"));
    assert_eq!(mock.hits(TOKEN_PATH).await, 0);

    assert_eq!(restarted.id_token().await.unwrap().expose(), "id-restored");
    assert_eq!(mock.hits(TOKEN_PATH).await, 1);
}

#[tokio::test]
async fn test_restore_without_file_is_signed_out() {
    let mock = FirebaseMock::start().await;
    let dir = TempDir::new().unwrap();

    let provider = provider(&mock, &dir);
    assert_eq!(provider.restore().await, SessionState::SignedOut);
    assert!(provider.current_principal().is_none());
}

#[tokio::test]
async fn test_revoked_refresh_signs_out_locally() {
    let mock = FirebaseMock::start().await;
    let dir = TempDir::new().unwrap();
    mock.mount_sign_in("u1", "ada@example.com", 0).await;
    mock.mount_error(TOKEN_PATH, "TOKEN_EXPIRED").await;

    let provider = provider(&mock, &dir);
    provider.sign_in("ada@example.com", "secret").await.unwrap();

    let err = provider.id_token().await.unwrap_err();
    assert_eq!(err.code, AuthErrorCode::UserTokenExpired);
    assert!(provider.current_principal().is_none());
    assert_eq!(*provider.subscribe().borrow(), SessionState::SignedOut);
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_sign_out_clears_persisted_session() {
    let mock = FirebaseMock::start().await;
    let dir = TempDir::new().unwrap();
    mock.mount_sign_in("u1", "ada@example.com", 3600).await;

    let provider = provider(&mock, &dir);
    provider.sign_in("ada@example.com", "secret").await.unwrap();
    assert!(dir.path().join("session.json").exists());

    provider.sign_out().await.unwrap();
    assert!(!dir.path().join("session.json").exists());
    assert_eq!(
        provider.id_token().await.unwrap_err().code,
        AuthErrorCode::NoCurrentUser
    );
}

#[tokio::test]
async fn test_federated_sign_in_with_assertion() {
    let mock = FirebaseMock::start().await;
    mock.mount_federated("g1", "grace@example.com", "Grace Hopper")
        .await;

    let mut config = mock.identity_config(None);
    config.federated_id_token = Some("google-assertion".to_string());
    let provider = FirebaseSessionProvider::new(config)
        .unwrap()
        .without_persistence();

    let principal = provider.sign_in_federated().await.unwrap();
    assert_eq!(principal.greeting_name(), "Grace Hopper");
    assert_eq!(mock.hits(IDP_PATH).await, 1);
}

#[tokio::test]
async fn test_unreachable_provider_is_network_failure() {
    let mock = FirebaseMock::start().await;
    let config = mock.identity_config(None);
    drop(mock);

    let provider = FirebaseSessionProvider::new(config)
        .unwrap()
        .without_persistence();
    let err = provider
        .sign_in("ada@example.com", "secret")
        .await
        .unwrap_err();
    assert_eq!(err.code, AuthErrorCode::NetworkRequestFailed);
}

#[tokio::test]
async fn test_gate_reports_invalid_credentials() {
    let mock = FirebaseMock::start().await;
    mock.mount_error(SIGN_IN_PATH, "INVALID_LOGIN_CREDENTIALS")
        .await;

    let provider = FirebaseSessionProvider::new(mock.identity_config(None))
        .unwrap()
        .without_persistence();
    let gate = CredentialGate::new(Arc::new(provider));

    let err = gate.submit("ada@example.com", "secret").await.unwrap_err();
    assert_eq!(
        err.user_message(),
        "Invalid email or password. Please check your credentials or sign up if you don't have an account."
    );
    assert_eq!(gate.error(), Some(err.user_message()));
    assert!(!gate.is_busy());
}

#[tokio::test]
async fn test_gate_sign_up_mode_creates_account() {
    let mock = FirebaseMock::start().await;
    mock.mount_sign_up("new-uid", "new@example.com", 3600).await;

    let provider = Arc::new(
        FirebaseSessionProvider::new(mock.identity_config(None))
            .unwrap()
            .without_persistence(),
    );
    let gate = CredentialGate::new(provider.clone());
    assert_eq!(gate.toggle_mode(), GateMode::SignUp);

    let principal = gate.submit("new@example.com", "secret").await.unwrap();
    assert_eq!(principal.uid, "new-uid");
    assert_eq!(mock.hits(SIGN_IN_PATH).await, 0);
    assert!(gate.error().is_none());
}
