use std::sync::Arc;

use errors::NoteError;
use jt_core::{Dialog, Note, NoteDraft, NoteId, NotesApi, SessionHandle};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::state::{Activity, ListView, Outcome, State};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this note?";
pub const EMAIL_PROMPT: &str = "Enter email address to send this note:";

/// Client-side note collection.
///
/// Methods take `&self`; the state lock is never held across an await, so
/// gestures can arrive while a call is in flight. One busy state covers every
/// backend action: a second action while one is outstanding fails with
/// [`NoteError::Busy`] without touching the backend or the current error.
///
/// Local state changes only after the backend acknowledges a mutation.
pub struct NoteCollection {
    api: Arc<dyn NotesApi>,
    dialog: Arc<dyn Dialog>,
    session: SessionHandle,
    state: Mutex<State>,
}

struct BusyGuard<'a> {
    state: &'a Mutex<State>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().busy = None;
    }
}

impl NoteCollection {
    pub fn new(api: Arc<dyn NotesApi>, dialog: Arc<dyn Dialog>, session: SessionHandle) -> Self {
        Self {
            api,
            dialog,
            session,
            state: Mutex::new(State::default()),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn notes(&self) -> Vec<Note> {
        self.state.lock().notes.clone()
    }

    pub fn view(&self) -> ListView {
        self.state.lock().view.clone()
    }

    /// The note being edited; `None` in draft mode.
    pub fn selected(&self) -> Option<Note> {
        self.state.lock().selected.clone()
    }

    pub fn is_draft(&self) -> bool {
        self.state.lock().selected.is_none()
    }

    pub fn editor(&self) -> NoteDraft {
        self.state.lock().editor.clone()
    }

    pub fn busy(&self) -> Option<Activity> {
        self.state.lock().busy
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn notice(&self) -> Option<String> {
        self.state.lock().notice.clone()
    }

    pub fn dismiss_error(&self) {
        self.state.lock().error = None;
    }

    pub fn dismiss_notice(&self) {
        self.state.lock().notice = None;
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.state.lock().editor.title = title.into();
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.state.lock().editor.content = content.into();
    }

    pub fn set_favorite(&self, is_favorite: bool) {
        self.state.lock().editor.is_favorite = is_favorite;
    }

    /// Enter edit mode on a listed note. Unknown ids are ignored.
    pub fn select(&self, id: &NoteId) -> bool {
        let mut state = self.state.lock();
        let Some(note) = state.notes.iter().find(|n| &n.id == id).cloned() else {
            debug!(id = %id, "Ignoring selection of unlisted note");
            return false;
        };
        state.enter_edit(note);
        true
    }

    /// Enter draft mode with an empty editor.
    pub fn new_note(&self) {
        self.state.lock().enter_draft();
    }

    /// Fetch the current view and replace the list wholesale.
    ///
    /// On failure the previous list stays.
    pub async fn load(&self) -> Result<(), NoteError> {
        let _busy = self.begin(Activity::Loading)?;
        let view = self.view();

        let result = match &view {
            ListView::All => self.api.list_notes(&self.session).await,
            ListView::Favorites => self.api.list_favorites(&self.session).await,
            ListView::Search(keyword) => self.api.search_notes(&self.session, keyword).await,
        };

        match result {
            Ok(notes) => {
                debug!(count = notes.len(), view = ?view, "Notes loaded");
                let mut state = self.state.lock();
                state.notes = notes;
                state.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(NoteError::api("Failed to load notes", e))),
        }
    }

    /// Flip between all notes and favorites, then reload.
    pub async fn toggle_favorites_view(&self) -> Result<(), NoteError> {
        let next = match self.view() {
            ListView::Favorites => ListView::All,
            _ => ListView::Favorites,
        };
        self.switch_view(next).await
    }

    /// Switch to server-side keyword search, then reload. A blank keyword
    /// clears the search.
    pub async fn search(&self, keyword: &str) -> Result<(), NoteError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.clear_search().await;
        }
        self.switch_view(ListView::Search(keyword.to_string())).await
    }

    pub async fn clear_search(&self) -> Result<(), NoteError> {
        self.switch_view(ListView::All).await
    }

    /// Reload under `next`; on failure the previous view comes back so the
    /// view always matches the list on display.
    async fn switch_view(&self, next: ListView) -> Result<(), NoteError> {
        self.ensure_idle()?;
        let previous = std::mem::replace(&mut self.state.lock().view, next.clone());

        let result = self.load().await;
        if result.is_err() {
            let mut state = self.state.lock();
            if state.view == next {
                debug!(view = ?previous, "Restoring view after failed reload");
                state.view = previous;
            }
        }
        result
    }

    /// Create (draft mode) or update (edit mode) from the editor buffer.
    pub async fn save(&self) -> Result<Note, NoteError> {
        let _busy = self.begin(Activity::Saving)?;
        let (draft, selected) = {
            let state = self.state.lock();
            (state.editor.clone(), state.selected.as_ref().map(|n| n.id.clone()))
        };

        if !draft.has_title() {
            return Err(self.fail(NoteError::BlankTitle));
        }

        let payload = draft.to_payload();
        match selected {
            Some(id) => match self.api.update_note(&self.session, &id, &payload).await {
                Ok(note) => {
                    info!(id = %note.id, "Note updated");
                    let mut state = self.state.lock();
                    if let Some(slot) = state.notes.iter_mut().find(|n| n.id == id) {
                        *slot = note.clone();
                    }
                    state.enter_edit(note.clone());
                    state.error = None;
                    Ok(note)
                }
                Err(e) => Err(self.fail(NoteError::api("Failed to save note", e))),
            },
            None => match self.api.create_note(&self.session, &payload).await {
                Ok(note) => {
                    info!(id = %note.id, "Note created");
                    let mut state = self.state.lock();
                    state.notes.insert(0, note.clone());
                    state.enter_edit(note.clone());
                    state.error = None;
                    Ok(note)
                }
                Err(e) => Err(self.fail(NoteError::api("Failed to save note", e))),
            },
        }
    }

    /// Delete the selected note after confirmation.
    pub async fn delete(&self) -> Result<Outcome, NoteError> {
        self.ensure_idle()?;
        let Some(id) = self.selected().map(|n| n.id) else {
            return Ok(Outcome::Aborted);
        };

        if !self.dialog.confirm(DELETE_CONFIRMATION).await {
            debug!(id = %id, "Delete cancelled");
            return Ok(Outcome::Aborted);
        }

        let _busy = self.begin(Activity::Deleting)?;
        match self.api.delete_note(&self.session, &id).await {
            Ok(()) => {
                info!(id = %id, "Note deleted");
                let mut state = self.state.lock();
                state.notes.retain(|n| n.id != id);
                if state.selected.as_ref().is_some_and(|n| n.id == id) {
                    state.enter_draft();
                }
                state.error = None;
                Ok(Outcome::Completed)
            }
            Err(e) => Err(self.fail(NoteError::api("Failed to delete note", e))),
        }
    }

    /// Email the selected note to an address asked from the user.
    pub async fn email(&self) -> Result<Outcome, NoteError> {
        self.ensure_idle()?;
        let Some(id) = self.selected().map(|n| n.id) else {
            return Err(self.fail(NoteError::NotPersisted));
        };

        let address = match self.dialog.prompt(EMAIL_PROMPT).await {
            Some(address) if !address.trim().is_empty() => address.trim().to_string(),
            _ => {
                debug!(id = %id, "Email cancelled");
                return Ok(Outcome::Aborted);
            }
        };

        let _busy = self.begin(Activity::Emailing)?;
        match self.api.email_note(&self.session, &id, &address).await {
            Ok(receipt) => {
                info!(id = %id, "Note emailed");
                let mut state = self.state.lock();
                state.notice = Some(receipt.summary());
                state.error = None;
                Ok(Outcome::Completed)
            }
            Err(e) => Err(self.fail(NoteError::api("Failed to send note", e))),
        }
    }

    /// End the session through the handle's provider.
    pub async fn sign_out(&self) -> Result<(), NoteError> {
        let _busy = self.begin(Activity::SigningOut)?;
        let SessionHandle::Provider(provider) = &self.session else {
            return Ok(());
        };
        match provider.sign_out().await {
            Ok(()) => {
                self.state.lock().error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(NoteError::SignOut(e))),
        }
    }

    fn ensure_idle(&self) -> Result<(), NoteError> {
        match self.state.lock().busy {
            Some(activity) => Err(NoteError::Busy {
                activity: activity.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn begin(&self, activity: Activity) -> Result<BusyGuard<'_>, NoteError> {
        let mut state = self.state.lock();
        if let Some(current) = state.busy {
            debug!(requested = %activity, current = %current, "Rejecting action while busy");
            return Err(NoteError::Busy {
                activity: current.to_string(),
            });
        }
        state.busy = Some(activity);
        state.notice = None;
        Ok(BusyGuard { state: &self.state })
    }

    fn fail(&self, err: NoteError) -> NoteError {
        if err.is_reported() {
            warn!(error = %err, "Note action failed");
            self.state.lock().error = Some(err.to_string());
        }
        err
    }
}

impl std::fmt::Debug for NoteCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("NoteCollection")
            .field("session", &self.session)
            .field("view", &state.view)
            .field("notes", &state.notes.len())
            .field("busy", &state.busy)
            .finish()
    }
}
