//! # ollie-client
//!
//! Session and authorization core of the Ollie skateboarding community
//! client. It restores and persists the logged-in session, wraps every
//! backend call with credential handling, runs like/unlike toggles and
//! routes moderation deletes to the right endpoint.

pub mod commands;
pub mod config;
pub mod engagement;
pub mod error;
pub mod events;
pub mod http;
pub mod moderation;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use events::{ClientEvent, EventBus, SessionEndReason};
pub use state::ClientContext;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ollie_client=debug,ollie_store=info,warn"));

    // A second call (tests, embedding hosts) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
