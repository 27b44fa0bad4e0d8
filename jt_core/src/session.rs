use std::sync::Arc;

use errors::AuthError;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::traits::SessionProvider;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Principal {
    /// Name to greet the user with: display name, then email, then uid.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Short-lived identity token, borrowed for a single request.
#[derive(Clone)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.0.as_str())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Session transitions published by a [`SessionProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The provider has not yet decided (restoring a persisted session).
    #[default]
    Unknown,
    SignedOut,
    SignedIn(Principal),
}

impl SessionState {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::SignedIn(p) => Some(p),
            _ => None,
        }
    }
}

/// Explicit session handle passed to every authenticated call.
///
/// `Anonymous` is the no-session marker: calls made with it carry no
/// credential.
#[derive(Clone, Default)]
pub enum SessionHandle {
    Provider(Arc<dyn SessionProvider>),
    #[default]
    Anonymous,
}

impl SessionHandle {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self::Provider(provider)
    }

    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    pub fn principal(&self) -> Option<Principal> {
        match self {
            Self::Provider(provider) => provider.current_principal(),
            Self::Anonymous => None,
        }
    }

    /// Fetch a live token if a principal is active.
    ///
    /// Always asks the provider; the handle never keeps a token.
    pub async fn bearer_token(&self) -> Result<Option<BearerToken>, AuthError> {
        match self {
            Self::Provider(provider) if provider.current_principal().is_some() => {
                provider.id_token().await.map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(provider) => f
                .debug_tuple("Provider")
                .field(&provider.current_principal().map(|p| p.uid))
                .finish(),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}
