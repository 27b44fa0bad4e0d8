use colored::Colorize;
use errors::{ApiError, ApiErrorKind};

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>,
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None,
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

pub fn server_not_connected(base_url: &str) -> UxError {
    UxError::new("Unable to connect to server.")
        .why(format!("No response from the notes backend at {}", base_url))
        .fix("Start the Jotter backend")
        .fix("Check your network connection")
        .fix("Set the backend URL with --api-url or JOTTER_API_BASE_URL")
        .suggest("jotter status")
}

pub fn not_signed_in() -> UxError {
    UxError::new("You are not signed in")
        .why("This command needs an authenticated session")
        .fix("Sign in with your email and password")
        .suggest("jotter login")
}

pub fn missing_api_key() -> UxError {
    UxError::new("No identity provider API key configured")
        .why("Signing in requires the Firebase web API key of your project")
        .fix("Set JOTTER_FIREBASE_API_KEY")
        .fix("Or add api_key under [identity] in ~/.config/jotter/config.toml")
}

pub fn auth_failed(message: &str) -> UxError {
    UxError::new(message.to_string())
        .fix("Check the email address and password")
        .fix("Create an account if you don't have one")
        .suggest("jotter login --sign-up")
}

pub fn note_not_found(id: &str) -> UxError {
    UxError::new(format!("Note not found: {}", id))
        .why("The note doesn't exist or belongs to another account")
        .fix("List your notes to find the right ID")
        .suggest("jotter notes list")
}

pub fn config_error(message: &str) -> UxError {
    UxError::new(format!("Configuration error: {}", message))
        .why("The configuration file or JOTTER_* variables are invalid")
        .fix("Check ~/.config/jotter/config.toml or the file passed with --config")
        .fix("Unset JOTTER_* variables you don't need")
}

pub fn session_expired() -> UxError {
    UxError::new("Your session has expired")
        .why("The identity provider no longer accepts the saved session")
        .fix("Sign in again")
        .suggest("jotter login")
}

/// Explain a failed note action. `message` is the controller's full message.
pub fn note_action_failed(message: &str, cause: Option<&ApiError>) -> UxError {
    let err = UxError::new(message.to_string());
    match cause.map(|c| (c.kind(), c.status())) {
        Some((ApiErrorKind::NoResponse, _)) => err
            .why("The notes backend did not answer")
            .fix("Check that the backend is running")
            .suggest("jotter status"),
        Some((ApiErrorKind::Server, Some(401 | 403))) => err
            .why("The backend rejected your credentials")
            .fix("Sign in again")
            .suggest("jotter login"),
        Some((ApiErrorKind::Server, Some(404))) => err
            .why("The note doesn't exist or belongs to another account")
            .suggest("jotter notes list"),
        Some((ApiErrorKind::Dispatch, _)) => err
            .why("The request could not be sent")
            .fix("Check the backend URL and your session"),
        _ => err,
    }
}
