use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use errors::{ApiErrorKind, NoteError};
use jt_core::{Dialog, NoteId, NotesApi};
use notes::{NoteCollection, Outcome};
use serde_json::json;

use crate::app::App;
use crate::dialog::{PresetDialog, TerminalDialog};
use crate::output;
use crate::ux_error;

#[derive(Subcommand)]
pub enum NotesCommand {
    #[command(about = "List notes")]
    List(NotesListArgs),

    #[command(about = "Show one note")]
    Show(NotesShowArgs),

    #[command(about = "Create a note")]
    Add(NotesAddArgs),

    #[command(about = "Edit a note")]
    Edit(NotesEditArgs),

    #[command(about = "Delete a note")]
    Delete(NotesDeleteArgs),

    #[command(about = "Email a note")]
    Email(NotesEmailArgs),

    #[command(about = "Show note counts")]
    Stats(NotesStatsArgs),
}

#[derive(Args)]
pub struct NotesListArgs {
    /// Only favorite notes
    #[arg(long, conflicts_with = "search")]
    pub favorites: bool,

    /// Server-side keyword search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct NotesShowArgs {
    /// Note ID
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct NotesAddArgs {
    /// Note title
    pub title: String,

    /// Note content
    #[arg(short, long, default_value = "")]
    pub content: String,

    /// Mark as favorite
    #[arg(short, long)]
    pub favorite: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct NotesEditArgs {
    /// Note ID
    pub id: String,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New content
    #[arg(short, long)]
    pub content: Option<String>,

    /// Set or clear the favorite flag
    #[arg(short, long)]
    pub favorite: Option<bool>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct NotesDeleteArgs {
    /// Note ID
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct NotesEmailArgs {
    /// Note ID
    pub id: String,

    /// Destination address (prompted when omitted)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args)]
pub struct NotesStatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &App, cmd: NotesCommand) -> Result<()> {
    app.require_principal()?;
    match cmd {
        NotesCommand::List(args) => run_list(app, args).await,
        NotesCommand::Show(args) => run_show(app, args).await,
        NotesCommand::Add(args) => run_add(app, args).await,
        NotesCommand::Edit(args) => run_edit(app, args).await,
        NotesCommand::Delete(args) => run_delete(app, args).await,
        NotesCommand::Email(args) => run_email(app, args).await,
        NotesCommand::Stats(args) => run_stats(app, args).await,
    }
}

async fn run_list(app: &App, args: NotesListArgs) -> Result<()> {
    let collection = app.collection(Arc::new(TerminalDialog));
    let loaded = if let Some(keyword) = &args.search {
        collection.search(keyword).await
    } else if args.favorites {
        collection.toggle_favorites_view().await
    } else {
        collection.load().await
    };
    loaded.map_err(explain(app))?;

    let notes = collection.notes();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    output::header(&collection.view().title());
    output::note_list(&notes, None);
    Ok(())
}

async fn run_show(app: &App, args: NotesShowArgs) -> Result<()> {
    let id = NoteId::new(args.id);
    let note = match app.notes.get_note(&app.session(), &id).await {
        Ok(note) => note,
        Err(e) if e.status() == Some(404) => {
            return Err(ux_error::note_not_found(id.as_str()).into());
        }
        Err(e) => return Err(explain(app)(NoteError::api("Failed to load note", e))),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        output::note_detail(&note);
    }
    Ok(())
}

async fn run_add(app: &App, args: NotesAddArgs) -> Result<()> {
    let collection = app.collection(Arc::new(TerminalDialog));
    collection.new_note();
    collection.set_title(args.title);
    collection.set_content(args.content);
    collection.set_favorite(args.favorite);
    let note = collection.save().await.map_err(explain(app))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        output::success(&format!("Created note {} \"{}\"", note.id, note.title));
    }
    Ok(())
}

async fn run_edit(app: &App, args: NotesEditArgs) -> Result<()> {
    if args.title.is_none() && args.content.is_none() && args.favorite.is_none() {
        output::hint("Nothing to change. Pass --title, --content or --favorite.");
        return Ok(());
    }

    let collection = app.collection(Arc::new(TerminalDialog));
    select(app, &collection, &args.id).await?;
    if let Some(title) = args.title {
        collection.set_title(title);
    }
    if let Some(content) = args.content {
        collection.set_content(content);
    }
    if let Some(favorite) = args.favorite {
        collection.set_favorite(favorite);
    }
    let note = collection.save().await.map_err(explain(app))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        output::success(&format!("Updated note {} \"{}\"", note.id, note.title));
    }
    Ok(())
}

async fn run_delete(app: &App, args: NotesDeleteArgs) -> Result<()> {
    let dialog: Arc<dyn Dialog> = if args.yes {
        Arc::new(PresetDialog {
            confirm: true,
            answer: None,
        })
    } else {
        Arc::new(TerminalDialog)
    };
    let collection = app.collection(dialog);
    select(app, &collection, &args.id).await?;

    match collection.delete().await.map_err(explain(app))? {
        Outcome::Completed => output::success(&format!("Deleted note {}", args.id)),
        Outcome::Aborted => output::info("Delete cancelled."),
    }
    Ok(())
}

async fn run_email(app: &App, args: NotesEmailArgs) -> Result<()> {
    let dialog: Arc<dyn Dialog> = match args.to {
        Some(to) => Arc::new(PresetDialog {
            confirm: true,
            answer: Some(to),
        }),
        None => Arc::new(TerminalDialog),
    };
    let collection = app.collection(dialog);
    select(app, &collection, &args.id).await?;

    match collection.email().await.map_err(explain(app))? {
        Outcome::Completed => {
            if let Some(notice) = collection.notice() {
                output::success(&notice);
            }
        }
        Outcome::Aborted => output::info("No address given. Nothing sent."),
    }
    Ok(())
}

async fn run_stats(app: &App, args: NotesStatsArgs) -> Result<()> {
    let stats = app
        .notes
        .stats(&app.session())
        .await
        .map_err(|e| explain(app)(NoteError::api("Failed to load statistics", e)))?;

    if args.json {
        let output = json!({
            "userEmail": stats.user_email,
            "totalNotes": stats.total_notes,
            "favoriteNotes": stats.favorite_notes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output::stats(&stats);
    }
    Ok(())
}

/// Load all notes and select `id`, failing when it is not listed.
async fn select(app: &App, collection: &NoteCollection, id: &str) -> Result<()> {
    collection.load().await.map_err(explain(app))?;
    if collection.select(&NoteId::new(id)) {
        Ok(())
    } else {
        Err(ux_error::note_not_found(id).into())
    }
}

/// Turn a controller error into a user-facing one.
fn explain(app: &App) -> impl Fn(NoteError) -> anyhow::Error + '_ {
    move |err| match &err {
        NoteError::Api { source, .. } if source.kind() == ApiErrorKind::NoResponse => {
            ux_error::server_not_connected(app.notes.pipeline().base_url().as_str()).into()
        }
        NoteError::Api { source, .. } => {
            ux_error::note_action_failed(&err.to_string(), Some(source)).into()
        }
        _ => ux_error::note_action_failed(&err.to_string(), None).into(),
    }
}
