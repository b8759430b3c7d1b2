//! # ollie-shared
//!
//! Types shared by every Ollie crate: the session and profile model, wire
//! payloads exchanged with the REST backend, client-side form validation and
//! the authorization policy that decides which actions a user may take.

pub mod constants;
pub mod error;
pub mod forms;
pub mod policy;
pub mod protocol;
pub mod types;

pub use error::ValidationError;
pub use types::{
    Credential, EntityKey, EntityKind, Profile, Resource, ResourceKind, Session, SessionId,
    UserId,
};
