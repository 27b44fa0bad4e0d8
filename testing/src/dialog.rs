use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use jt_core::Dialog;
use parking_lot::Mutex;

/// Dialog that answers from queues and records what it was asked.
///
/// An exhausted queue answers as a cancelled dialog would.
#[derive(Default)]
pub struct ScriptedDialog {
    confirms: Mutex<VecDeque<bool>>,
    prompts: Mutex<VecDeque<Option<String>>>,
    asked: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedDialog {
    pub fn new() -> Self {
        Self::default()
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn confirm_with(self, answer: bool) -> Self {
        self.confirms.lock().push_back(answer);
        self
    }

    pub fn prompt_with(self, answer: Option<&str>) -> Self {
        self.prompts.lock().push_back(answer.map(str::to_string));
        self
    }

    /// Keep every dialog open for `delay` before answering.
    pub fn answer_after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every message shown so far, confirmations and prompts interleaved.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl Dialog for ScriptedDialog {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.lock().push(message.to_string());
        self.wait().await;
        self.confirms.lock().pop_front().unwrap_or(false)
    }

    async fn prompt(&self, message: &str) -> Option<String> {
        self.asked.lock().push(message.to_string());
        self.wait().await;
        self.prompts.lock().pop_front().flatten()
    }
}
