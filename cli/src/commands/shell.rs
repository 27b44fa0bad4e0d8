use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};
use errors::{GateError, NoteError};
use identity::{CredentialGate, GateMode};
use jt_core::{Principal, SessionProvider, SessionState};
use notes::{ListView, NoteCollection};
use tracing::debug;

use crate::app::App;
use crate::dialog::{TerminalDialog, interact};
use crate::output;
use crate::ux_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Quit,
}

/// Gate while signed out, notes while signed in, until the user quits.
pub async fn run(app: &App) -> Result<()> {
    let mut states = app.provider.subscribe();
    loop {
        let state = states.borrow_and_update().clone();
        let step = match state {
            SessionState::SignedIn(principal) => notes_screen(app, &principal).await?,
            SessionState::SignedOut | SessionState::Unknown => gate_screen(app).await?,
        };
        if step == Step::Quit {
            return Ok(());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum GateAction {
    Submit(GateMode),
    Toggle(GateMode),
    Federated,
    Quit,
}

impl fmt::Display for GateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit(mode) => f.write_str(mode.label()),
            Self::Toggle(GateMode::SignIn) => f.write_str("Need an account? Sign up"),
            Self::Toggle(GateMode::SignUp) => f.write_str("Have an account? Sign in"),
            Self::Federated => f.write_str("Sign in with Google"),
            Self::Quit => f.write_str("Quit"),
        }
    }
}

async fn gate_screen(app: &App) -> Result<Step> {
    let gate = app.gate()?;
    loop {
        let mode = gate.mode();
        println!();
        output::header(&format!("Jotter - {}", mode.label()));
        if let Some(err) = gate.error() {
            output::error(&err);
        }

        let actions = [
            GateAction::Submit(mode),
            GateAction::Toggle(mode),
            GateAction::Federated,
            GateAction::Quit,
        ];
        let action = choose("Choose an action", &actions).await?;

        let result = match action {
            GateAction::Submit(_) => submit(&gate).await?,
            GateAction::Federated => gate.federated_sign_in().await,
            GateAction::Toggle(_) => {
                gate.toggle_mode();
                continue;
            }
            GateAction::Quit => return Ok(Step::Quit),
        };

        if let Ok(principal) = result {
            output::success(&format!("Welcome, {}", principal.greeting_name()));
            return Ok(Step::Continue);
        }
    }
}

async fn submit(gate: &CredentialGate) -> Result<Result<Principal, GateError>> {
    let email = interact(|| {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Email")
            .allow_empty(true)
            .interact_text()
    })
    .await?;
    let password = interact(|| {
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()
    })
    .await?;
    Ok(gate.submit(&email, &password).await)
}

#[derive(Debug, Clone, Copy)]
enum NoteAction {
    Open,
    New,
    EditTitle,
    EditContent,
    ToggleFavorite,
    Save,
    Delete,
    Email,
    ToggleView(bool),
    Search,
    ClearSearch,
    Reload,
    SignOut,
    Quit,
}

impl fmt::Display for NoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "Open a note",
            Self::New => "New note",
            Self::EditTitle => "Edit title",
            Self::EditContent => "Edit content",
            Self::ToggleFavorite => "Toggle favorite",
            Self::Save => "Save",
            Self::Delete => "Delete",
            Self::Email => "Email",
            Self::ToggleView(true) => "Show all notes",
            Self::ToggleView(false) => "Show favorites",
            Self::Search => "Search",
            Self::ClearSearch => "Clear search",
            Self::Reload => "Reload",
            Self::SignOut => "Sign out",
            Self::Quit => "Quit",
        };
        f.write_str(label)
    }
}

fn note_actions(collection: &NoteCollection) -> Vec<NoteAction> {
    let view = collection.view();
    let mut actions = Vec::new();
    if !collection.notes().is_empty() {
        actions.push(NoteAction::Open);
    }
    actions.extend([
        NoteAction::New,
        NoteAction::EditTitle,
        NoteAction::EditContent,
        NoteAction::ToggleFavorite,
        NoteAction::Save,
    ]);
    if !collection.is_draft() {
        actions.extend([NoteAction::Delete, NoteAction::Email]);
    }
    actions.push(NoteAction::ToggleView(view == ListView::Favorites));
    actions.push(NoteAction::Search);
    if matches!(view, ListView::Search(_)) {
        actions.push(NoteAction::ClearSearch);
    }
    actions.extend([NoteAction::Reload, NoteAction::SignOut, NoteAction::Quit]);
    actions
}

async fn notes_screen(app: &App, principal: &Principal) -> Result<Step> {
    let collection = app.collection(Arc::new(TerminalDialog));
    report(collection.load().await);

    loop {
        if app.principal().is_none() {
            ux_error::session_expired().display();
            return Ok(Step::Continue);
        }

        render(&collection, principal);

        let actions = note_actions(&collection);
        let action = choose("What next?", &actions).await?;
        match action {
            NoteAction::Open => open(&collection).await?,
            NoteAction::New => collection.new_note(),
            NoteAction::EditTitle => {
                let current = collection.editor().title;
                let title = edit_text("Title", current).await?;
                collection.set_title(title);
            }
            NoteAction::EditContent => {
                let current = collection.editor().content;
                let content = edit_text("Content", current).await?;
                collection.set_content(content);
            }
            NoteAction::ToggleFavorite => {
                let favorite = collection.editor().is_favorite;
                collection.set_favorite(!favorite);
            }
            NoteAction::Save => report(collection.save().await.map(|_| ())),
            NoteAction::Delete => report(collection.delete().await.map(|_| ())),
            NoteAction::Email => report(collection.email().await.map(|_| ())),
            NoteAction::ToggleView(_) => report(collection.toggle_favorites_view().await),
            NoteAction::Search => {
                let keyword = edit_text("Search for", String::new()).await?;
                report(collection.search(&keyword).await);
            }
            NoteAction::ClearSearch => report(collection.clear_search().await),
            NoteAction::Reload => report(collection.load().await),
            NoteAction::SignOut => {
                if collection.sign_out().await.is_ok() {
                    output::success("Signed out");
                    return Ok(Step::Continue);
                }
            }
            NoteAction::Quit => return Ok(Step::Quit),
        }
    }
}

fn render(collection: &NoteCollection, principal: &Principal) {
    let selected = collection.selected();
    let editor = collection.editor();

    println!();
    output::header(&format!("Welcome, {}", principal.greeting_name()));
    output::subheader(&collection.view().title());
    output::note_list(&collection.notes(), selected.as_ref());

    println!();
    match &selected {
        Some(note) => output::subheader(&format!("Editing note {}", note.id)),
        None => output::subheader("New note"),
    }
    let star = if editor.is_favorite { " ★" } else { "" };
    println!("  title:   {}{}", editor.title, star);
    println!("  content: {}", editor.content.replace('\n', " "));

    if let Some(err) = collection.error() {
        output::error(&err);
    }
    if let Some(notice) = collection.notice() {
        output::success(&notice);
    }
}

async fn open(collection: &NoteCollection) -> Result<()> {
    let notes = collection.notes();
    let titles: Vec<String> = notes.iter().map(|n| n.title.clone()).collect();
    let index = interact(move || {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Open which note?")
            .items(&titles)
            .default(0)
            .interact_opt()
    })
    .await?;
    if let Some(note) = index.and_then(|i| notes.get(i)) {
        collection.select(&note.id);
    }
    Ok(())
}

async fn edit_text(prompt: &'static str, initial: String) -> Result<String> {
    interact(move || {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
    })
    .await
}

async fn choose<T>(prompt: &'static str, items: &[T]) -> Result<T>
where
    T: fmt::Display + Copy + Send + 'static,
{
    let labels: Vec<String> = items.iter().map(ToString::to_string).collect();
    let index = interact(move || {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact()
    })
    .await?;
    Ok(items[index])
}

/// The controller already holds the message; only log here.
fn report(result: Result<(), NoteError>) {
    if let Err(e) = result {
        debug!(error = %e, "Shell action failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jt_core::SessionHandle;
    use testing::{RecordingNotesApi, ScriptedDialog, note};

    fn collection(api: RecordingNotesApi) -> NoteCollection {
        NoteCollection::new(
            Arc::new(api),
            Arc::new(ScriptedDialog::new()),
            SessionHandle::anonymous(),
        )
    }

    #[test]
    fn test_draft_menu_hides_delete_and_email() {
        let actions = note_actions(&collection(RecordingNotesApi::new()));
        let labels: Vec<String> = actions.iter().map(ToString::to_string).collect();
        assert!(!labels.contains(&"Open a note".to_string()));
        assert!(!labels.contains(&"Delete".to_string()));
        assert!(labels.contains(&"Show favorites".to_string()));
        assert_eq!(labels.last().map(String::as_str), Some("Quit"));
    }

    #[tokio::test]
    async fn test_edit_menu_offers_delete_and_email() {
        let notes = collection(RecordingNotesApi::with_notes(vec![note("1", "Groceries")]));
        notes.load().await.unwrap();
        assert!(notes.select(&jt_core::NoteId::new("1")));

        let labels: Vec<String> = note_actions(&notes).iter().map(ToString::to_string).collect();
        assert!(labels.contains(&"Open a note".to_string()));
        assert!(labels.contains(&"Delete".to_string()));
        assert!(labels.contains(&"Email".to_string()));
    }

    #[tokio::test]
    async fn test_search_menu_offers_clear() {
        let notes = collection(RecordingNotesApi::new());
        notes.search("milk").await.unwrap();
        let labels: Vec<String> = note_actions(&notes).iter().map(ToString::to_string).collect();
        assert!(labels.contains(&"Clear search".to_string()));
    }

    #[test]
    fn test_gate_labels_follow_mode() {
        assert_eq!(GateAction::Submit(GateMode::SignUp).to_string(), "Sign Up");
        assert_eq!(
            GateAction::Toggle(GateMode::SignIn).to_string(),
            "Need an account? Sign up"
        );
    }
}
