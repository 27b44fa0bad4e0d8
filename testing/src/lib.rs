//! Shared test doubles for the Jotter workspace.
//!
//! - [`ScriptedSessionProvider`]: in-memory identity provider with scripted
//!   failures
//! - [`ScriptedDialog`]: queued answers for confirmations and prompts
//! - [`RecordingNotesApi`]: in-memory notes backend that records every call
//! - [`FirebaseMock`]: wiremock server speaking the identity REST protocol
//!
//! Fixtures such as [`note`] and [`unique_id`] live alongside.

mod dialog;
mod firebase;
mod fixtures;
mod notes_api;
mod session;

pub use dialog::ScriptedDialog;
pub use firebase::{FirebaseMock, IDP_PATH, SIGN_IN_PATH, SIGN_UP_PATH, TOKEN_PATH};
pub use fixtures::*;
pub use notes_api::{ApiCall, ApiOp, RecordingNotesApi};
pub use session::ScriptedSessionProvider;
