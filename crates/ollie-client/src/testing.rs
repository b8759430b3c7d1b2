//! Test helpers: an in-process fake backend and a throwaway client context.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use ollie_shared::{Credential, Profile, Session, SessionId, UserId};
use ollie_store::Database;
use tempfile::TempDir;

use crate::config::ClientConfig;
use crate::state::ClientContext;

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake backend");
    });
    format!("http://{addr}")
}

/// A context backed by a fresh database in a temporary directory.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub(crate) fn test_context(base_url: &str) -> (TempDir, ClientContext) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::open_in_dir(dir.path()).expect("open database");
    let ctx = ClientContext::with_database(ClientConfig::with_api_url(base_url), db)
        .expect("client context");
    (dir, ctx)
}

pub(crate) fn profile(id: i64, is_admin: bool) -> Profile {
    Profile {
        id: UserId(id),
        username: format!("skater{id}"),
        email: format!("skater{id}@example.com"),
        region: Some("Bretagne".into()),
        is_admin,
        google_linked: false,
        is_verified: true,
    }
}

pub(crate) fn login_as(ctx: &ClientContext, token: &str, profile: Profile) -> SessionId {
    ctx.session
        .commit(Session::new(Credential::new(token), profile))
        .expect("commit session")
}

/// Counts requests seen by a fake backend, keyed by a label.
#[derive(Debug, Clone, Default)]
pub(crate) struct Hits(Arc<Mutex<HashMap<String, usize>>>);

impl Hits {
    pub(crate) fn record(&self, label: &str) {
        *self
            .0
            .lock()
            .unwrap()
            .entry(label.to_string())
            .or_default() += 1;
    }

    pub(crate) fn count(&self, label: &str) -> usize {
        self.0.lock().unwrap().get(label).copied().unwrap_or(0)
    }

    pub(crate) fn total(&self) -> usize {
        self.0.lock().unwrap().values().sum()
    }
}
