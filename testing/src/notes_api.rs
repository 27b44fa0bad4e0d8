use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use errors::ApiError;
use jt_core::{
    EmailReceipt, Note, NoteId, NotePayload, NoteStats, NotesApi, SessionHandle,
};
use parking_lot::Mutex;

/// Which [`NotesApi`] method a call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    List,
    Favorites,
    Search,
    Get,
    Create,
    Update,
    Delete,
    Email,
    Stats,
}

/// One recorded call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Favorites,
    Search(String),
    Get(NoteId),
    Create(NotePayload),
    Update(NoteId, NotePayload),
    Delete(NoteId),
    Email(NoteId, String),
    Stats,
}

impl ApiCall {
    pub fn op(&self) -> ApiOp {
        match self {
            Self::List => ApiOp::List,
            Self::Favorites => ApiOp::Favorites,
            Self::Search(_) => ApiOp::Search,
            Self::Get(_) => ApiOp::Get,
            Self::Create(_) => ApiOp::Create,
            Self::Update(..) => ApiOp::Update,
            Self::Delete(_) => ApiOp::Delete,
            Self::Email(..) => ApiOp::Email,
            Self::Stats => ApiOp::Stats,
        }
    }
}

/// In-memory notes backend.
///
/// Lists come back newest first. Scripted failures are consumed one per
/// call of the matching operation.
#[derive(Default)]
pub struct RecordingNotesApi {
    notes: Mutex<Vec<Note>>,
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<HashMap<ApiOp, VecDeque<ApiError>>>,
    delay: Mutex<Option<Duration>>,
    next_id: AtomicU64,
}

impl RecordingNotesApi {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        let api = Self::new();
        *api.notes.lock() = notes;
        api
    }

    pub fn fail_next(&self, op: ApiOp, error: ApiError) {
        self.failures.lock().entry(op).or_default().push_back(error);
    }

    /// Delay applied before every call completes.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn ops(&self) -> Vec<ApiOp> {
        self.calls.lock().iter().map(ApiCall::op).collect()
    }

    pub fn stored(&self) -> Vec<Note> {
        self.notes.lock().clone()
    }

    async fn enter(&self, call: ApiCall) -> Result<(), ApiError> {
        let op = call.op();
        self.calls.lock().push(call);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.lock().get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn newest_first(&self, keep: impl Fn(&Note) -> bool) -> Vec<Note> {
        let mut notes: Vec<Note> = self.notes.lock().iter().filter(|n| keep(n)).cloned().collect();
        notes.reverse();
        notes
    }

    fn not_found() -> ApiError {
        ApiError::from_response(404, r#"{"message":"Note not found"}"#)
    }
}

#[async_trait]
impl NotesApi for RecordingNotesApi {
    async fn list_notes(&self, _session: &SessionHandle) -> Result<Vec<Note>, ApiError> {
        self.enter(ApiCall::List).await?;
        Ok(self.newest_first(|_| true))
    }

    async fn list_favorites(&self, _session: &SessionHandle) -> Result<Vec<Note>, ApiError> {
        self.enter(ApiCall::Favorites).await?;
        Ok(self.newest_first(|n| n.is_favorite))
    }

    async fn search_notes(
        &self,
        _session: &SessionHandle,
        keyword: &str,
    ) -> Result<Vec<Note>, ApiError> {
        self.enter(ApiCall::Search(keyword.to_string())).await?;
        Ok(self.newest_first(|n| n.title.contains(keyword) || n.content.contains(keyword)))
    }

    async fn get_note(&self, _session: &SessionHandle, id: &NoteId) -> Result<Note, ApiError> {
        self.enter(ApiCall::Get(id.clone())).await?;
        self.notes
            .lock()
            .iter()
            .find(|n| &n.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create_note(
        &self,
        _session: &SessionHandle,
        payload: &NotePayload,
    ) -> Result<Note, ApiError> {
        self.enter(ApiCall::Create(payload.clone())).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let note = Note {
            id: NoteId::new(format!("n{id}")),
            title: payload.title.clone(),
            content: payload.content.clone(),
            is_favorite: payload.is_favorite,
            created_at: Utc::now(),
            updated_at: None,
            user_id: None,
            user_email: None,
        };
        self.notes.lock().push(note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        _session: &SessionHandle,
        id: &NoteId,
        payload: &NotePayload,
    ) -> Result<Note, ApiError> {
        self.enter(ApiCall::Update(id.clone(), payload.clone())).await?;
        let mut notes = self.notes.lock();
        let note = notes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(Self::not_found)?;
        note.title = payload.title.clone();
        note.content = payload.content.clone();
        note.is_favorite = payload.is_favorite;
        note.updated_at = Some(Utc::now());
        Ok(note.clone())
    }

    async fn delete_note(&self, _session: &SessionHandle, id: &NoteId) -> Result<(), ApiError> {
        self.enter(ApiCall::Delete(id.clone())).await?;
        let mut notes = self.notes.lock();
        let before = notes.len();
        notes.retain(|n| &n.id != id);
        if notes.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn email_note(
        &self,
        _session: &SessionHandle,
        id: &NoteId,
        address: &str,
    ) -> Result<EmailReceipt, ApiError> {
        self.enter(ApiCall::Email(id.clone(), address.to_string()))
            .await?;
        let title = self
            .notes
            .lock()
            .iter()
            .find(|n| &n.id == id)
            .map(|n| n.title.clone())
            .ok_or_else(Self::not_found)?;
        Ok(EmailReceipt {
            message: Some("Note sent successfully".to_string()),
            note_id: Some(id.clone()),
            note_title: Some(title),
            sent_to: Some(address.to_string()),
        })
    }

    async fn stats(&self, _session: &SessionHandle) -> Result<NoteStats, ApiError> {
        self.enter(ApiCall::Stats).await?;
        let notes = self.notes.lock();
        Ok(NoteStats {
            user_email: None,
            total_notes: notes.len() as u64,
            favorite_notes: notes.iter().filter(|n| n.is_favorite).count() as u64,
        })
    }
}
