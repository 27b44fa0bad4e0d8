use std::path::PathBuf;

use config::IdentityConfig;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SIGN_IN_PATH: &str = "/v1/accounts:signInWithPassword";
pub const SIGN_UP_PATH: &str = "/v1/accounts:signUp";
pub const IDP_PATH: &str = "/v1/accounts:signInWithIdp";
pub const TOKEN_PATH: &str = "/v1/token";

const API_KEY: &str = "test-api-key";

/// Mock identity provider serving both the accounts and the token endpoints.
pub struct FirebaseMock {
    server: MockServer,
}

impl FirebaseMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Identity configuration pointing at this server.
    pub fn identity_config(&self, session_file: Option<PathBuf>) -> IdentityConfig {
        IdentityConfig {
            api_key: API_KEY.to_string(),
            auth_url: self.uri(),
            token_url: self.uri(),
            session_file,
            ..IdentityConfig::default()
        }
    }

    pub async fn mount_sign_in(&self, uid: &str, email: &str, expires_in: u64) {
        self.mount_account(SIGN_IN_PATH, uid, email, expires_in).await;
    }

    pub async fn mount_sign_up(&self, uid: &str, email: &str, expires_in: u64) {
        self.mount_account(SIGN_UP_PATH, uid, email, expires_in).await;
    }

    pub async fn mount_federated(&self, uid: &str, email: &str, display_name: &str) {
        Mock::given(method("POST"))
            .and(path(IDP_PATH))
            .and(query_param("key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": uid,
                "email": email,
                "displayName": display_name,
                "idToken": format!("id-{uid}"),
                "refreshToken": format!("refresh-{uid}"),
                "expiresIn": "3600"
            })))
            .mount(&self.server)
            .await;
    }

    /// Reject calls to `endpoint` with the provider's error envelope.
    pub async fn mount_error(&self, endpoint: &str, message: &str) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": message }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_refresh(&self, id_token: &str, refresh_token: &str, expires_in: u64) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(query_param("key", API_KEY))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": id_token,
                "refresh_token": refresh_token,
                "expires_in": expires_in.to_string(),
                "token_type": "Bearer"
            })))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received on `endpoint`.
    pub async fn hits(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == endpoint)
            .count()
    }

    async fn mount_account(&self, endpoint: &str, uid: &str, email: &str, expires_in: u64) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(query_param("key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": uid,
                "email": email,
                "idToken": format!("id-{uid}"),
                "refreshToken": format!("refresh-{uid}"),
                "expiresIn": expires_in.to_string()
            })))
            .mount(&self.server)
            .await;
    }
}
