//! # ollie-store
//!
//! Durable client-local storage for the Ollie client, backed by SQLite.
//!
//! The store plays the role a browser's local storage plays for a web
//! client: a small key/value table that survives restarts. The crate exposes
//! a synchronous `Database` handle wrapping a `rusqlite::Connection`, generic
//! key/value helpers and typed helpers for the persisted session record.

pub mod database;
pub mod migrations;
pub mod session;
pub mod storage;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use session::LoadedSession;
