//! Seam traits for the Jotter client

use async_trait::async_trait;
use errors::{ApiError, AuthError};
use tokio::sync::watch;

use crate::session::{BearerToken, Principal, SessionHandle, SessionState};
use crate::types::{EmailReceipt, Note, NoteId, NotePayload, NoteStats};

/// Identity provider capability.
///
/// Owns the session exclusively. Implementations may cache tokens
/// internally; callers must ask again for every request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn current_principal(&self) -> Option<Principal>;

    /// A currently valid identity token for the active principal.
    async fn id_token(&self) -> Result<BearerToken, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    /// Provider-federated sign-in gesture.
    async fn sign_in_federated(&self) -> Result<Principal, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Receiver for sign-in/sign-out transitions.
    fn subscribe(&self) -> watch::Receiver<SessionState>;
}

/// Typed operations against the notes backend.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list_notes(&self, session: &SessionHandle) -> Result<Vec<Note>, ApiError>;

    async fn list_favorites(&self, session: &SessionHandle) -> Result<Vec<Note>, ApiError>;

    async fn search_notes(
        &self,
        session: &SessionHandle,
        keyword: &str,
    ) -> Result<Vec<Note>, ApiError>;

    async fn get_note(&self, session: &SessionHandle, id: &NoteId) -> Result<Note, ApiError>;

    async fn create_note(
        &self,
        session: &SessionHandle,
        payload: &NotePayload,
    ) -> Result<Note, ApiError>;

    async fn update_note(
        &self,
        session: &SessionHandle,
        id: &NoteId,
        payload: &NotePayload,
    ) -> Result<Note, ApiError>;

    async fn delete_note(&self, session: &SessionHandle, id: &NoteId) -> Result<(), ApiError>;

    async fn email_note(
        &self,
        session: &SessionHandle,
        id: &NoteId,
        address: &str,
    ) -> Result<EmailReceipt, ApiError>;

    async fn stats(&self, session: &SessionHandle) -> Result<NoteStats, ApiError>;
}

/// Asynchronous user interaction: confirmations and text prompts.
///
/// `false` / `None` mean the user cancelled.
#[async_trait]
pub trait Dialog: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;

    async fn prompt(&self, message: &str) -> Option<String>;
}
