//! Command handlers called by the front end.
//!
//! Each sub-module groups related commands by domain. Handlers take the
//! shared [`ClientContext`](crate::state::ClientContext) and return
//! [`ClientError`](crate::error::ClientError) on failure.

pub mod auth;
