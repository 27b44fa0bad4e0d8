use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use config::IdentityConfig;
use errors::{AuthError, AuthErrorCode};
use jt_core::{BearerToken, Principal, SessionProvider, SessionState};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::store::{SessionStore, StoredSession};

/// Session provider backed by the Firebase Authentication REST API.
///
/// Holds the refresh token and a cached id token. The id token is refreshed
/// `refresh_margin_seconds` before it expires; refreshes are serialized by
/// the token lock.
pub struct FirebaseSessionProvider {
    http_client: Client,
    config: IdentityConfig,
    store: Option<SessionStore>,
    state: watch::Sender<SessionState>,
    tokens: Mutex<Option<TokenSet>>,
}

struct TokenSet {
    refresh_token: Zeroizing<String>,
    id_token: Option<CachedToken>,
}

struct CachedToken {
    token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl FirebaseSessionProvider {
    pub fn new(config: IdentityConfig) -> Result<Self, AuthError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AuthError::new(AuthErrorCode::Internal, "Failed to build HTTP client").with_cause(e)
            })?;

        let store = config.session_path().map(SessionStore::new);
        let (state, _) = watch::channel(SessionState::Unknown);

        Ok(Self {
            http_client,
            config,
            store,
            state,
            tokens: Mutex::new(None),
        })
    }

    /// Disable persistence (sessions live only as long as the process).
    pub fn without_persistence(mut self) -> Self {
        self.store = None;
        self
    }

    /// Restore a persisted session, publishing the resulting state.
    ///
    /// No network call is made; the first [`SessionProvider::id_token`] call
    /// exchanges the refresh token.
    pub async fn restore(&self) -> SessionState {
        let stored = match &self.store {
            Some(store) => match store.load().await {
                Ok(stored) => stored,
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable session file");
                    None
                }
            },
            None => None,
        };

        let state = match stored {
            Some(stored) => {
                *self.tokens.lock().await = Some(TokenSet {
                    refresh_token: Zeroizing::new(stored.refresh_token),
                    id_token: None,
                });
                info!(uid = %stored.principal.uid, "Restored session");
                SessionState::SignedIn(stored.principal)
            }
            None => SessionState::SignedOut,
        };

        self.state.send_replace(state.clone());
        state
    }

    fn endpoint(&self, base: &str, path: &str) -> String {
        format!(
            "{}{}?key={}",
            base.trim_end_matches('/'),
            path,
            urlencoding::encode(&self.config.api_key)
        )
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    async fn password_flow(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Principal, AuthError> {
        let url = self.endpoint(&self.config.auth_url, path);
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let response: SignInResponse = self.post_json(&url, &request).await?;
        self.establish(response).await
    }

    async fn establish(&self, response: SignInResponse) -> Result<Principal, AuthError> {
        let principal = Principal {
            uid: response.local_id,
            email: response.email,
            display_name: response.display_name.filter(|n| !n.is_empty()),
        };
        let expires_at = expiry_from(&response.expires_in);

        *self.tokens.lock().await = Some(TokenSet {
            refresh_token: Zeroizing::new(response.refresh_token.clone()),
            id_token: Some(CachedToken {
                token: Zeroizing::new(response.id_token),
                expires_at,
            }),
        });

        self.persist(&principal, response.refresh_token).await;
        info!(uid = %principal.uid, "Signed in");
        self.state
            .send_replace(SessionState::SignedIn(principal.clone()));
        Ok(principal)
    }

    async fn persist(&self, principal: &Principal, refresh_token: String) {
        let Some(store) = &self.store else {
            return;
        };
        let stored = StoredSession {
            principal: principal.clone(),
            refresh_token,
        };
        if let Err(e) = store.save(&stored).await {
            warn!(error = %e, "Session could not be persisted");
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let url = self.endpoint(&self.config.token_url, "/v1/token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self
            .http_client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(network_error)?;
        decode(response).await
    }

    async fn forget(&self) -> Result<(), AuthError> {
        *self.tokens.lock().await = None;
        let cleared = match &self.store {
            Some(store) => store.clear().await,
            None => Ok(()),
        };
        self.state.send_replace(SessionState::SignedOut);
        cleared
    }
}

#[async_trait]
impl SessionProvider for FirebaseSessionProvider {
    fn current_principal(&self) -> Option<Principal> {
        self.state.borrow().principal().cloned()
    }

    async fn id_token(&self) -> Result<BearerToken, AuthError> {
        let mut guard = self.tokens.lock().await;
        let Some(tokens) = guard.as_mut() else {
            return Err(AuthError::new(
                AuthErrorCode::NoCurrentUser,
                "No user is signed in",
            ));
        };

        let margin = chrono::Duration::seconds(self.config.refresh_margin_seconds as i64);
        if let Some(cached) = &tokens.id_token {
            if cached.expires_at > Utc::now() + margin {
                return Ok(BearerToken::new(cached.token.as_str()));
            }
        }

        debug!("Refreshing id token");
        let refresh_token = tokens.refresh_token.clone();
        let refreshed = match self.refresh(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) if e.code == AuthErrorCode::UserTokenExpired
                || e.code == AuthErrorCode::UserDisabled
                || e.code == AuthErrorCode::UserNotFound =>
            {
                warn!(code = %e.code, "Session revoked by provider, signing out");
                drop(guard);
                if let Err(clear_err) = self.forget().await {
                    warn!(error = %clear_err, "Failed to clear revoked session");
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let rotated = refreshed.refresh_token != refresh_token.as_str();
        tokens.refresh_token = Zeroizing::new(refreshed.refresh_token.clone());
        tokens.id_token = Some(CachedToken {
            token: Zeroizing::new(refreshed.id_token.clone()),
            expires_at: expiry_from(&refreshed.expires_in),
        });
        drop(guard);

        if rotated {
            if let Some(principal) = self.current_principal() {
                self.persist(&principal, refreshed.refresh_token).await;
            }
        }

        Ok(BearerToken::new(refreshed.id_token))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        self.password_flow("/v1/accounts:signInWithPassword", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        self.password_flow("/v1/accounts:signUp", email, password)
            .await
    }

    async fn sign_in_federated(&self) -> Result<Principal, AuthError> {
        let Some(assertion) = self.config.federated_id_token.as_deref() else {
            return Err(AuthError::new(
                AuthErrorCode::FederatedCancelled,
                "No federated identity assertion is available",
            ));
        };

        let url = self.endpoint(&self.config.auth_url, "/v1/accounts:signInWithIdp");
        let request = IdpRequest {
            post_body: format!(
                "id_token={}&providerId={}",
                urlencoding::encode(assertion),
                urlencoding::encode(&self.config.federated_provider)
            ),
            request_uri: "http://localhost",
            return_secure_token: true,
            return_idp_credential: true,
        };
        let response: SignInResponse = self.post_json(&url, &request).await?;
        self.establish(response).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        info!("Signing out");
        self.forget().await
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

async fn decode<T>(response: reqwest::Response) -> Result<T, AuthError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    let body = response.text().await.map_err(network_error)?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_default();
        let code = code_from_provider_message(&message);
        warn!(status = status.as_u16(), code = %code, "Identity provider rejected request");
        return Err(AuthError::new(
            code,
            if message.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                message
            },
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        AuthError::new(
            AuthErrorCode::Internal,
            "Unexpected identity provider response",
        )
        .with_cause(e)
    })
}

fn network_error(e: reqwest::Error) -> AuthError {
    AuthError::new(AuthErrorCode::NetworkRequestFailed, e.to_string()).with_cause(e)
}

fn expiry_from(expires_in: &str) -> DateTime<Utc> {
    let seconds = expires_in.trim().parse::<i64>().unwrap_or(0);
    Utc::now() + chrono::Duration::seconds(seconds)
}

/// Map a provider message such as `"WEAK_PASSWORD : Password should be at
/// least 6 characters"` to a code.
pub fn code_from_provider_message(message: &str) -> AuthErrorCode {
    let head = message.split(':').next().unwrap_or_default().trim();
    match head {
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => AuthErrorCode::InvalidCredential,
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthErrorCode::UserNotFound,
        "INVALID_PASSWORD" => AuthErrorCode::WrongPassword,
        "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
        "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
        "USER_DISABLED" => AuthErrorCode::UserDisabled,
        "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => AuthErrorCode::OperationNotAllowed,
        "UNAUTHORIZED_DOMAIN" => AuthErrorCode::UnauthorizedDomain,
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
            AuthErrorCode::UserTokenExpired
        }
        _ => AuthErrorCode::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_messages_map_to_codes() {
        assert_eq!(
            code_from_provider_message("EMAIL_EXISTS"),
            AuthErrorCode::EmailAlreadyInUse
        );
        assert_eq!(
            code_from_provider_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthErrorCode::WeakPassword
        );
        assert_eq!(
            code_from_provider_message("INVALID_LOGIN_CREDENTIALS"),
            AuthErrorCode::InvalidCredential
        );
        assert_eq!(
            code_from_provider_message("TOO_MANY_ATTEMPTS_TRY_LATER : Try again later."),
            AuthErrorCode::TooManyRequests
        );
        assert_eq!(code_from_provider_message(""), AuthErrorCode::Internal);
        assert_eq!(
            code_from_provider_message("SOMETHING_NEW"),
            AuthErrorCode::Internal
        );
    }

    #[test]
    fn test_expiry_parsing() {
        let before = Utc::now();
        let expiry = expiry_from("3600");
        assert!(expiry >= before + chrono::Duration::seconds(3599));
        assert!(expiry_from("garbage") <= Utc::now());
    }

    #[tokio::test]
    async fn test_id_token_without_session_fails() {
        let provider = FirebaseSessionProvider::new(IdentityConfig::default())
            .unwrap()
            .without_persistence();
        let err = provider.id_token().await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::NoCurrentUser);
        assert!(provider.current_principal().is_none());
    }

    #[tokio::test]
    async fn test_federated_without_assertion_is_cancelled() {
        let provider = FirebaseSessionProvider::new(IdentityConfig::default())
            .unwrap()
            .without_persistence();
        let err = provider.sign_in_federated().await.unwrap_err();
        assert_eq!(err.code, AuthErrorCode::FederatedCancelled);
    }
}
