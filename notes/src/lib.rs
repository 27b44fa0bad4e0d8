//! Note Collection Controller.
//!
//! [`NoteCollection`] owns the local note list, the current list view, the
//! selection and the editor buffer. It reaches the backend only through a
//! [`jt_core::NotesApi`] and asks the user through a [`jt_core::Dialog`].

pub mod controller;
pub mod state;

pub use controller::NoteCollection;
pub use state::{Activity, ListView, Outcome};
