use std::sync::Arc;

use anyhow::Result;
use client::NotesClient;
use config::Config;
use identity::{CredentialGate, FirebaseSessionProvider};
use jt_core::{Dialog, Principal, SessionHandle, SessionProvider};
use notes::NoteCollection;
use tracing::debug;

use crate::ux_error;

/// Everything a command needs, built once from configuration.
pub struct App {
    pub config: Config,
    pub provider: Arc<FirebaseSessionProvider>,
    pub notes: Arc<NotesClient>,
}

impl App {
    /// Build the provider and client, restoring any saved session.
    pub async fn start(config: Config) -> Result<Self> {
        let provider = FirebaseSessionProvider::new(config.identity.clone())?;
        let state = provider.restore().await;
        debug!(?state, "Session restored");

        let notes = NotesClient::new(&config.api)?;
        Ok(Self {
            config,
            provider: Arc::new(provider),
            notes: Arc::new(notes),
        })
    }

    pub fn session(&self) -> SessionHandle {
        SessionHandle::new(self.provider.clone())
    }

    pub fn principal(&self) -> Option<Principal> {
        self.provider.current_principal()
    }

    pub fn require_principal(&self) -> Result<Principal> {
        self.principal()
            .ok_or_else(|| ux_error::not_signed_in().into())
    }

    /// Credential gate, provided an API key is configured.
    pub fn gate(&self) -> Result<CredentialGate> {
        if self.config.identity.api_key.trim().is_empty() {
            return Err(ux_error::missing_api_key().into());
        }
        Ok(CredentialGate::new(self.provider.clone()))
    }

    pub fn collection(&self, dialog: Arc<dyn Dialog>) -> NoteCollection {
        NoteCollection::new(self.notes.clone(), dialog, self.session())
    }
}
