use async_trait::async_trait;
use config::ApiConfig;
use errors::ApiError;
use jt_core::{
    EmailReceipt, Note, NoteId, NotePayload, NoteStats, NotesApi, SessionHandle,
};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::pipeline::ApiClient;

/// Typed notes operations over the [`ApiClient`] pipeline.
#[derive(Debug, Clone)]
pub struct NotesClient {
    api: ApiClient,
}

impl NotesClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    pub fn from_client(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn pipeline(&self) -> &ApiClient {
        &self.api
    }

    /// Unauthenticated liveness check (`GET /health`).
    pub async fn health(&self) -> Result<Value, ApiError> {
        let url = self.api.url(&["health"]);
        self.api
            .send(&SessionHandle::anonymous(), Method::GET, url, None)
            .await
    }

    /// Ask the backend what it makes of the current token.
    pub async fn verify_token(&self, session: &SessionHandle) -> Result<Value, ApiError> {
        let url = self.api.url(&["api", "auth", "verify-token"]);
        self.api.send(session, Method::POST, url, None).await
    }

    fn notes_url(&self, rest: &[&str]) -> Url {
        let mut segments = vec!["api", "notes"];
        segments.extend_from_slice(rest);
        self.api.url(&segments)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        session: &SessionHandle,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let value = self.api.send(session, method, url, body).await?;
        serde_json::from_value(value).map_err(ApiError::dispatch)
    }
}

fn payload_body(payload: &NotePayload) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(ApiError::dispatch)
}

#[async_trait]
impl NotesApi for NotesClient {
    async fn list_notes(&self, session: &SessionHandle) -> Result<Vec<Note>, ApiError> {
        self.fetch(session, Method::GET, self.notes_url(&[]), None)
            .await
    }

    async fn list_favorites(&self, session: &SessionHandle) -> Result<Vec<Note>, ApiError> {
        self.fetch(session, Method::GET, self.notes_url(&["favorites"]), None)
            .await
    }

    async fn search_notes(
        &self,
        session: &SessionHandle,
        keyword: &str,
    ) -> Result<Vec<Note>, ApiError> {
        let mut url = self.notes_url(&["search"]);
        url.query_pairs_mut().append_pair("keyword", keyword);
        self.fetch(session, Method::GET, url, None).await
    }

    async fn get_note(&self, session: &SessionHandle, id: &NoteId) -> Result<Note, ApiError> {
        self.fetch(session, Method::GET, self.notes_url(&[id.as_str()]), None)
            .await
    }

    async fn create_note(
        &self,
        session: &SessionHandle,
        payload: &NotePayload,
    ) -> Result<Note, ApiError> {
        let body = payload_body(payload)?;
        self.fetch(session, Method::POST, self.notes_url(&[]), Some(&body))
            .await
    }

    async fn update_note(
        &self,
        session: &SessionHandle,
        id: &NoteId,
        payload: &NotePayload,
    ) -> Result<Note, ApiError> {
        let body = payload_body(payload)?;
        self.fetch(
            session,
            Method::PUT,
            self.notes_url(&[id.as_str()]),
            Some(&body),
        )
        .await
    }

    async fn delete_note(&self, session: &SessionHandle, id: &NoteId) -> Result<(), ApiError> {
        self.api
            .send(session, Method::DELETE, self.notes_url(&[id.as_str()]), None)
            .await
            .map(|_| ())
    }

    async fn email_note(
        &self,
        session: &SessionHandle,
        id: &NoteId,
        address: &str,
    ) -> Result<EmailReceipt, ApiError> {
        let mut url = self.notes_url(&[id.as_str(), "send-email"]);
        url.query_pairs_mut().append_pair("email", address);
        match self.api.send(session, Method::POST, url, None).await? {
            Value::Object(map) => {
                serde_json::from_value(Value::Object(map)).map_err(ApiError::dispatch)
            }
            Value::String(message) => Ok(EmailReceipt {
                message: Some(message),
                ..EmailReceipt::default()
            }),
            _ => Ok(EmailReceipt::default()),
        }
    }

    async fn stats(&self, session: &SessionHandle) -> Result<NoteStats, ApiError> {
        self.fetch(session, Method::GET, self.notes_url(&["stats"]), None)
            .await
    }
}
