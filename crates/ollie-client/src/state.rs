//! Application state shared by every command.
//!
//! [`ClientContext`] is cheap to clone and hands out the shared session, the
//! authenticated HTTP client and the event bus. Per-view components such as
//! [`EngagementController`] are built from it on demand.

use std::sync::Arc;

use ollie_store::Database;

use crate::config::ClientConfig;
use crate::engagement::EngagementController;
use crate::error::Result;
use crate::events::EventBus;
use crate::http::RequestAuthenticator;
use crate::moderation::ModerationGateway;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct ClientContext {
    pub config: Arc<ClientConfig>,
    pub session: Arc<SessionStore>,
    pub api: Arc<RequestAuthenticator>,
    pub events: EventBus,
}

impl ClientContext {
    /// Open the database named by `config` and restore the persisted session.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let db = match &config.data_dir {
            Some(dir) => Database::open_in_dir(dir)?,
            None => Database::open_default()?,
        };
        Self::with_database(config, db)
    }

    pub fn with_database(config: ClientConfig, db: Database) -> Result<Self> {
        let events = EventBus::new();
        let session = Arc::new(SessionStore::open(db));
        let api = Arc::new(RequestAuthenticator::new(
            &config,
            session.clone(),
            events.clone(),
        )?);
        tracing::info!(
            api_url = %config.api_url,
            authenticated = session.is_authenticated(),
            "client context ready"
        );
        Ok(Self {
            config: Arc::new(config),
            session,
            api,
            events,
        })
    }

    /// A fresh controller for one mounted view.
    pub fn engagement(&self) -> EngagementController {
        EngagementController::new(self.api.clone())
    }

    pub fn moderation(&self) -> ModerationGateway {
        ModerationGateway::new(self.api.clone())
    }
}
