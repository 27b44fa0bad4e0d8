//! # Jotter Core
//!
//! Shared types and traits for the Jotter note client.
//!
//! This crate provides:
//! - The note data model as exchanged with the notes backend
//! - Session types (principal, bearer token, explicit session handle)
//! - The seam traits the rest of the workspace is written against:
//!   [`SessionProvider`], [`NotesApi`] and [`Dialog`]
//!
//! # Best Practices
//!
//! - Session state is always passed explicitly as a [`SessionHandle`]; no
//!   crate looks up an ambient "current user"
//! - Tokens live in zeroize-on-drop buffers and never appear in `Debug` output

pub mod session;
pub mod traits;
pub mod types;

pub use session::{BearerToken, Principal, SessionHandle, SessionState};
pub use traits::{Dialog, NotesApi, SessionProvider};
pub use types::{EmailReceipt, Note, NoteDraft, NoteId, NotePayload, NoteStats, UserId};
