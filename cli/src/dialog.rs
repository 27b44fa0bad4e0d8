use anyhow::Result;
use async_trait::async_trait;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use jt_core::Dialog;
use tracing::debug;

/// Run a blocking terminal interaction off the async workers.
pub async fn interact<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

/// Confirmations and prompts on the controlling terminal.
pub struct TerminalDialog;

#[async_trait]
impl Dialog for TerminalDialog {
    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_string();
        let answer = interact(move || {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(message)
                .default(false)
                .interact()
        })
        .await;
        answer.unwrap_or_else(|e| {
            debug!(error = %e, "Confirmation dismissed");
            false
        })
    }

    async fn prompt(&self, message: &str) -> Option<String> {
        let message = message.to_string();
        let answer = interact(move || {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt(message)
                .allow_empty(true)
                .interact_text()
        })
        .await;
        match answer {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(error = %e, "Prompt dismissed");
                None
            }
        }
    }
}

/// Answers given up front on the command line (`--yes`, `--to`).
pub struct PresetDialog {
    pub confirm: bool,
    pub answer: Option<String>,
}

#[async_trait]
impl Dialog for PresetDialog {
    async fn confirm(&self, _message: &str) -> bool {
        self.confirm
    }

    async fn prompt(&self, _message: &str) -> Option<String> {
        self.answer.clone()
    }
}
