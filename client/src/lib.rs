//! HTTP access to the Jotter notes backend.
//!
//! [`ApiClient`] is the single choke point for backend calls: it attaches a
//! live bearer token when the session has a principal and collapses every
//! failure into an [`errors::ApiError`]. [`NotesClient`] layers the typed
//! note operations on top of it.

pub mod notes;
pub mod pipeline;
pub mod telemetry;

pub use notes::NotesClient;
pub use pipeline::ApiClient;
pub use reqwest::Method;
