//! Identity for the Jotter note client.
//!
//! - [`FirebaseSessionProvider`]: a [`jt_core::SessionProvider`] backed by the
//!   Firebase Authentication REST API, with on-disk session persistence
//! - [`CredentialGate`]: the sign-in / sign-up surface in front of any
//!   session provider

pub mod firebase;
pub mod gate;
pub mod store;

pub use firebase::FirebaseSessionProvider;
pub use gate::{CredentialGate, GateMode, MIN_PASSWORD_LEN};
pub use store::{SessionStore, StoredSession};
