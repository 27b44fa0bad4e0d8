//! # Jotter Errors
//!
//! Error taxonomy for the Jotter note client.
//!
//! - [`ApiError`]: every failure of the authenticated request pipeline,
//!   collapsed into one of three disjoint kinds
//! - [`AuthError`] / [`AuthErrorCode`]: identity-provider failures and their
//!   fixed table of user-facing messages
//! - [`GateError`]: credential gate failures
//! - [`NoteError`]: note controller failures
//!
//! Uses `thiserror` for structured error definitions.

use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message for requests that were sent but never answered.
pub const NO_RESPONSE_MESSAGE: &str = "Unable to connect to server.";

/// Message for server errors whose body carries nothing usable.
pub const GENERIC_SERVER_MESSAGE: &str = "An error occurred";

/// Which of the three failure shapes an [`ApiError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ApiErrorKind {
    Server,
    NoResponse,
    Dispatch,
}

/// Normalized pipeline error.
///
/// Callers only ever see the message; transport error types stay behind
/// the optional `cause`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A response arrived with a non-success status.
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    /// The request went out but no response came back.
    #[error("Unable to connect to server.")]
    NoResponse {
        #[source]
        cause: Option<BoxError>,
    },

    /// The request could not be built or sent.
    #[error("{message}")]
    Dispatch {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
}

impl ApiError {
    /// Build a server error from the raw response body.
    ///
    /// The message is the body's `message` field, then the raw body, then
    /// [`GENERIC_SERVER_MESSAGE`].
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Server {
            status,
            message: server_message(body),
            cause: None,
        }
    }

    pub fn no_response(cause: impl Into<BoxError>) -> Self {
        Self::NoResponse {
            cause: Some(cause.into()),
        }
    }

    /// Pass the underlying description through verbatim.
    pub fn dispatch<E>(cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Dispatch {
            message: cause.to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn dispatch_message(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
            cause: None,
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Server { .. } => ApiErrorKind::Server,
            Self::NoResponse { .. } => ApiErrorKind::NoResponse,
            Self::Dispatch { .. } => ApiErrorKind::Dispatch,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn server_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(serde_json::Value::String(message)) = map.get("message") {
            if !message.trim().is_empty() {
                return message.clone();
            }
        }
    }
    if body.trim().is_empty() {
        GENERIC_SERVER_MESSAGE.to_string()
    } else {
        body.to_string()
    }
}

/// Identity-provider failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum AuthErrorCode {
    #[strum(serialize = "auth/invalid-credential")]
    InvalidCredential,
    #[strum(serialize = "auth/user-not-found")]
    UserNotFound,
    #[strum(serialize = "auth/wrong-password")]
    WrongPassword,
    #[strum(serialize = "auth/email-already-in-use")]
    EmailAlreadyInUse,
    #[strum(serialize = "auth/weak-password")]
    WeakPassword,
    #[strum(serialize = "auth/invalid-email")]
    InvalidEmail,
    #[strum(serialize = "auth/too-many-requests")]
    TooManyRequests,
    #[strum(serialize = "auth/user-disabled")]
    UserDisabled,
    #[strum(serialize = "auth/operation-not-allowed")]
    OperationNotAllowed,
    #[strum(serialize = "auth/unauthorized-domain")]
    UnauthorizedDomain,
    #[strum(serialize = "auth/popup-closed-by-user")]
    FederatedCancelled,
    #[strum(serialize = "auth/popup-blocked")]
    FederatedBlocked,
    #[strum(serialize = "auth/network-request-failed")]
    NetworkRequestFailed,
    #[strum(serialize = "auth/user-token-expired")]
    UserTokenExpired,
    #[strum(serialize = "auth/no-current-user")]
    NoCurrentUser,
    #[strum(serialize = "auth/internal-error")]
    Internal,
}

impl AuthErrorCode {
    /// User-facing message for this code.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidCredential | Self::UserNotFound | Self::WrongPassword => {
                "Invalid email or password. Please check your credentials or sign up if you don't have an account."
            }
            Self::EmailAlreadyInUse => {
                "An account with this email already exists. Please sign in instead."
            }
            Self::WeakPassword => "Password is too weak. Please use at least 6 characters.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::TooManyRequests => "Too many failed attempts. Please try again later.",
            Self::UserDisabled => "This account has been disabled. Please contact support.",
            Self::OperationNotAllowed => {
                "This sign-in method is not enabled. Please contact support."
            }
            Self::UnauthorizedDomain => {
                "This domain is not authorized for authentication. Please contact support."
            }
            Self::FederatedCancelled => "Sign-in was cancelled. Please try again.",
            Self::FederatedBlocked => {
                "Pop-up was blocked by your browser. Please allow pop-ups and try again."
            }
            Self::NetworkRequestFailed
            | Self::UserTokenExpired
            | Self::NoCurrentUser
            | Self::Internal => {
                "An unexpected error occurred. Please try again or contact support."
            }
        }
    }
}

/// Failure reported by a session provider.
#[derive(Debug, Error)]
#[error("{code}: {detail}")]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub detail: String,
    #[source]
    pub cause: Option<BoxError>,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn user_message(&self) -> &'static str {
        self.code.user_message()
    }
}

/// Credential gate failures.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("A sign-in attempt is already in progress")]
    Busy,

    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),
}

impl GateError {
    /// Message the gate shows to the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Note controller failures.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Please enter a title for your note")]
    BlankTitle,

    #[error("Please save the note first")]
    NotPersisted,

    #[error("Another action is still in progress: {activity}")]
    Busy { activity: String },

    #[error("{action}: {source}")]
    Api {
        action: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Failed to sign out: {}", .0.detail)]
    SignOut(#[source] AuthError),
}

impl NoteError {
    pub fn api(action: &'static str, source: ApiError) -> Self {
        Self::Api { action, source }
    }

    /// Whether the controller records this error as its current message.
    pub fn is_reported(&self) -> bool {
        !matches!(self, Self::Busy { .. })
    }
}
