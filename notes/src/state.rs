use jt_core::{Note, NoteDraft};
use strum::Display;

/// Which server-side listing the collection mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListView {
    #[default]
    All,
    Favorites,
    Search(String),
}

impl ListView {
    pub fn title(&self) -> String {
        match self {
            Self::All => "All notes".to_string(),
            Self::Favorites => "Favorite notes".to_string(),
            Self::Search(keyword) => format!("Notes matching \"{keyword}\""),
        }
    }
}

/// The action currently holding the busy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Activity {
    #[strum(serialize = "loading notes")]
    Loading,
    #[strum(serialize = "saving note")]
    Saving,
    #[strum(serialize = "deleting note")]
    Deleting,
    #[strum(serialize = "sending note")]
    Emailing,
    #[strum(serialize = "signing out")]
    SigningOut,
}

/// How an action that may ask the user ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Nothing to act on, or the user cancelled.
    Aborted,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub notes: Vec<Note>,
    pub view: ListView,
    pub selected: Option<Note>,
    pub editor: NoteDraft,
    pub busy: Option<Activity>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl State {
    pub fn enter_draft(&mut self) {
        self.selected = None;
        self.editor = NoteDraft::default();
    }

    pub fn enter_edit(&mut self, note: Note) {
        self.editor = NoteDraft::from_note(&note);
        self.selected = Some(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_titles() {
        assert_eq!(ListView::All.title(), "All notes");
        assert_eq!(
            ListView::Search("milk".into()).title(),
            "Notes matching \"milk\""
        );
    }

    #[test]
    fn test_activity_display() {
        assert_eq!(Activity::Saving.to_string(), "saving note");
    }
}
