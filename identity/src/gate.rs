use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use errors::{AuthError, AuthErrorCode, GateError};
use jt_core::{Principal, SessionProvider};
use parking_lot::Mutex;
use tracing::{info, warn};
use validator::ValidateEmail;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Whether a submit creates a session or a new account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateMode {
    #[default]
    SignIn,
    SignUp,
}

impl GateMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Sign Up",
        }
    }
}

/// Credential entry in front of a [`SessionProvider`].
///
/// One attempt at a time; the current error message is replaced on every
/// attempt and cleared when an attempt starts.
pub struct CredentialGate {
    provider: Arc<dyn SessionProvider>,
    mode: Mutex<GateMode>,
    busy: AtomicBool,
    error: Mutex<Option<String>>,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CredentialGate {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            provider,
            mode: Mutex::new(GateMode::SignIn),
            busy: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> GateMode {
        *self.mode.lock()
    }

    pub fn set_mode(&self, mode: GateMode) {
        *self.mode.lock() = mode;
    }

    /// Flip between sign-in and sign-up, returning the new mode.
    pub fn toggle_mode(&self) -> GateMode {
        let mut mode = self.mode.lock();
        *mode = match *mode {
            GateMode::SignIn => GateMode::SignUp,
            GateMode::SignUp => GateMode::SignIn,
        };
        *mode
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    /// Email/password submission in the current mode.
    pub async fn submit(&self, email: &str, password: &str) -> Result<Principal, GateError> {
        let _busy = self.begin()?;
        let mode = self.mode();

        let result = match validate_credentials(email, password) {
            Err(e) => Err(e),
            Ok(()) => match mode {
                GateMode::SignIn => self.provider.sign_in(email.trim(), password).await,
                GateMode::SignUp => self.provider.sign_up(email.trim(), password).await,
            },
        };

        self.finish(result, mode.label())
    }

    /// Provider-federated sign-in gesture.
    pub async fn federated_sign_in(&self) -> Result<Principal, GateError> {
        let _busy = self.begin()?;
        let result = self.provider.sign_in_federated().await;
        self.finish(result, "Federated sign-in")
    }

    pub async fn sign_out(&self) -> Result<(), GateError> {
        let _busy = self.begin()?;
        self.provider.sign_out().await.map_err(|e| {
            warn!(code = %e.code, detail = %e.detail, "Sign-out failed");
            let err = GateError::from(e);
            *self.error.lock() = Some(err.user_message());
            err
        })
    }

    fn begin(&self) -> Result<BusyGuard<'_>, GateError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GateError::Busy);
        }
        *self.error.lock() = None;
        Ok(BusyGuard(&self.busy))
    }

    fn finish(
        &self,
        result: Result<Principal, AuthError>,
        attempt: &str,
    ) -> Result<Principal, GateError> {
        match result {
            Ok(principal) => {
                info!(uid = %principal.uid, attempt, "Authentication succeeded");
                Ok(principal)
            }
            Err(e) => {
                warn!(code = %e.code, detail = %e.detail, attempt, "Authentication error");
                let err = GateError::from(e);
                *self.error.lock() = Some(err.user_message());
                Err(err)
            }
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.validate_email() {
        return Err(AuthError::new(
            AuthErrorCode::InvalidEmail,
            "Email address failed local validation",
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::new(
            AuthErrorCode::WeakPassword,
            format!("Password shorter than {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}
