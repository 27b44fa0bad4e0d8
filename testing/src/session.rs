use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use errors::{AuthError, AuthErrorCode};
use jt_core::{BearerToken, Principal, SessionProvider, SessionState};
use parking_lot::Mutex;
use tokio::sync::watch;

/// In-memory identity provider.
///
/// Any email/password pair signs in unless a failure was scripted with
/// [`ScriptedSessionProvider::fail_next`]. Tokens are `token-<n>` where `n`
/// counts token requests.
pub struct ScriptedSessionProvider {
    state: watch::Sender<SessionState>,
    token_requests: AtomicUsize,
    next_failure: Mutex<Option<AuthErrorCode>>,
    token_failure: Mutex<Option<AuthErrorCode>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedSessionProvider {
    pub fn signed_out() -> Self {
        Self::with_state(SessionState::SignedOut)
    }

    pub fn signed_in(principal: Principal) -> Self {
        Self::with_state(SessionState::SignedIn(principal))
    }

    fn with_state(state: SessionState) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            state,
            token_requests: AtomicUsize::new(0),
            next_failure: Mutex::new(None),
            token_failure: Mutex::new(None),
            delay: Mutex::new(None),
        }
    }

    /// The next sign-in, sign-up or federated attempt fails with `code`.
    pub fn fail_next(&self, code: AuthErrorCode) {
        *self.next_failure.lock() = Some(code);
    }

    /// Every token request fails with `code` until cleared.
    pub fn fail_tokens(&self, code: Option<AuthErrorCode>) {
        *self.token_failure.lock() = code;
    }

    /// Delay applied to every sign-in style call.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    async fn attempt(&self, principal: Principal) -> Result<Principal, AuthError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.next_failure.lock().take();
        if let Some(code) = failure {
            return Err(AuthError::new(code, "scripted failure"));
        }
        self.state
            .send_replace(SessionState::SignedIn(principal.clone()));
        Ok(principal)
    }
}

#[async_trait]
impl SessionProvider for ScriptedSessionProvider {
    fn current_principal(&self) -> Option<Principal> {
        self.state.borrow().principal().cloned()
    }

    async fn id_token(&self) -> Result<BearerToken, AuthError> {
        if self.current_principal().is_none() {
            return Err(AuthError::new(
                AuthErrorCode::NoCurrentUser,
                "No user is signed in",
            ));
        }
        let failure = *self.token_failure.lock();
        if let Some(code) = failure {
            return Err(AuthError::new(code, "scripted token failure"));
        }
        let n = self.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(BearerToken::new(format!("token-{n}")))
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<Principal, AuthError> {
        self.attempt(Principal {
            uid: format!("uid-{email}"),
            email: Some(email.to_string()),
            display_name: None,
        })
        .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        self.sign_in(email, password).await
    }

    async fn sign_in_federated(&self) -> Result<Principal, AuthError> {
        self.attempt(Principal {
            uid: "uid-federated".to_string(),
            email: Some("federated@example.com".to_string()),
            display_name: Some("Federated User".to_string()),
        })
        .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.state.send_replace(SessionState::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
