pub mod auth;
pub mod completion;
pub mod notes;
pub mod shell;
pub mod status;

use clap::{Parser, Subcommand};

use crate::settings::GlobalArgs;

#[derive(Parser)]
#[command(
    name = "jotter",
    author,
    version,
    about = "Jotter - personal notes from the terminal",
    long_about = "Sign in once, then keep notes in the Jotter backend.\n\nRun without a \
                  command for the interactive shell. Configuration comes from \
                  ~/.config/jotter/config.toml, JOTTER_* env vars and the flags below."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Interactive shell (default when no command is given)")]
    Shell,

    #[command(about = "Sign in or create an account")]
    Login(auth::LoginArgs),

    #[command(about = "Sign out and forget the saved session")]
    Logout,

    #[command(about = "Show who is signed in")]
    Whoami(auth::WhoamiArgs),

    #[command(subcommand, about = "List, add, edit, delete and email notes")]
    Notes(notes::NotesCommand),

    #[command(about = "Check backend health and token verification")]
    Status(status::StatusArgs),

    #[command(about = "Generate shell completions")]
    Completion(completion::CompletionArgs),
}
