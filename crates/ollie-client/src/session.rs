//! Lifecycle of the authenticated session.
//!
//! [`SessionStore`] is the single owner of "who is logged in". It keeps the
//! active session in memory and mirrors it into the client database so it
//! survives restarts. Every mutation takes the database lock first and then
//! updates memory while still holding it, so durable and in-memory state move
//! together and a credential is never held without its profile.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use ollie_shared::{Credential, Profile, Session, SessionId};
use ollie_store::{Database, LoadedSession};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
struct ActiveSession {
    id: SessionId,
    session: Session,
}

pub struct SessionStore {
    db: Mutex<Database>,
    active: RwLock<Option<ActiveSession>>,
    profile_tx: watch::Sender<Option<Profile>>,
}

impl SessionStore {
    /// Wrap `database` and restore any persisted session before returning.
    ///
    /// Restoration is part of construction: there is no way to obtain a
    /// store, and therefore no way to make an authorization decision, before
    /// the persisted session has been either installed or discarded.
    pub fn open(database: Database) -> Self {
        let (profile_tx, _) = watch::channel(None);
        let store = Self {
            db: Mutex::new(database),
            active: RwLock::new(None),
            profile_tx,
        };
        store.restore();
        store
    }

    /// Reload the session from durable storage.
    ///
    /// Anything that is not a complete, well-formed record yields the
    /// logged-out state; stale fragments are erased.
    pub fn restore(&self) -> Option<Session> {
        let mut db = self.db();
        match db.load_session() {
            Ok(LoadedSession::Complete(session)) => {
                let id = SessionId::new();
                info!(user_id = %session.profile.id, session = %id, "session restored");
                self.install(Some(ActiveSession {
                    id,
                    session: session.clone(),
                }));
                Some(session)
            }
            Ok(LoadedSession::Absent) => {
                debug!("no persisted session");
                self.install(None);
                None
            }
            Ok(LoadedSession::Corrupt(reason)) => {
                warn!(%reason, "discarding corrupt persisted session");
                if let Err(e) = db.clear_session() {
                    warn!(error = %e, "failed to erase corrupt session record");
                }
                self.install(None);
                None
            }
            Err(e) => {
                warn!(error = %e, "could not read persisted session, starting logged out");
                self.install(None);
                None
            }
        }
    }

    /// Persist and activate a new session.
    pub fn commit(&self, session: Session) -> Result<SessionId> {
        let mut db = self.db();
        db.save_session(&session)?;

        let id = SessionId::new();
        info!(user_id = %session.profile.id, session = %id, "session committed");
        self.install(Some(ActiveSession { id, session }));
        Ok(id)
    }

    /// Replace the profile of session `id`, keeping its credential and id.
    ///
    /// Fails with `NotAuthenticated` when `id` is no longer the active
    /// session, so a profile fetched for one session never lands on another.
    pub fn refresh_profile(&self, id: SessionId, profile: Profile) -> Result<()> {
        let mut db = self.db();
        let mut active = self
            .snapshot()
            .filter(|active| active.id == id)
            .ok_or(ClientError::NotAuthenticated)?;
        active.session.profile = profile;
        db.save_session(&active.session)?;

        debug!(session = %active.id, "profile refreshed");
        self.install(Some(active));
        Ok(())
    }

    /// Erase the session from memory and durable storage.
    ///
    /// Clearing an empty store is a no-op. Memory is cleared even when the
    /// durable delete fails; the storage error is still returned.
    pub fn clear(&self) -> Result<()> {
        let mut db = self.db();
        let previous = self.install(None);
        let result = db.clear_session();
        if let Some(previous) = previous {
            info!(user_id = %previous.session.profile.id, session = %previous.id, "session cleared");
        }
        result.map(|_| ()).map_err(ClientError::from)
    }

    /// Clear the session only if `id` is still the active one.
    ///
    /// Returns `true` when this call ended the session, so that several
    /// rejections of the same credential end it exactly once.
    pub fn invalidate(&self, id: SessionId) -> bool {
        let mut db = self.db();
        if !self.is_current(id) {
            return false;
        }
        self.install(None);
        if let Err(e) = db.clear_session() {
            warn!(error = %e, "failed to erase rejected session record");
        }
        true
    }

    pub fn current(&self) -> Option<Session> {
        self.snapshot().map(|active| active.session)
    }

    pub fn profile(&self) -> Option<Profile> {
        self.snapshot().map(|active| active.session.profile)
    }

    pub fn credential(&self) -> Option<Credential> {
        self.snapshot().map(|active| active.session.credential)
    }

    /// Credential to attach to an outgoing request, with the session it belongs to.
    pub fn authorization(&self) -> Option<(SessionId, Credential)> {
        self.snapshot()
            .map(|active| (active.id, active.session.credential))
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.read().as_ref().map(|active| active.id)
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.session_id() == Some(id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Watch the current profile; `None` while logged out.
    pub fn subscribe(&self) -> watch::Receiver<Option<Profile>> {
        self.profile_tx.subscribe()
    }

    fn install(&self, next: Option<ActiveSession>) -> Option<ActiveSession> {
        let profile = next.as_ref().map(|active| active.session.profile.clone());
        let previous = {
            let mut guard = self.active.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        self.profile_tx.send_replace(profile);
        previous
    }

    fn snapshot(&self) -> Option<ActiveSession> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<ActiveSession>> {
        self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::profile;
    use ollie_shared::constants::{TOKEN_STORAGE_KEY, USER_STORAGE_KEY};

    fn open(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::open(Database::open_in_dir(dir.path()).unwrap())
    }

    fn session(token: &str, id: i64) -> Session {
        Session::new(Credential::new(token), profile(id, false))
    }

    /// Credential and profile are either both present or both absent, in
    /// memory and on disk.
    fn assert_consistent(store: &SessionStore) {
        let in_memory = store.current();
        assert_eq!(store.authorization().is_some(), store.profile().is_some());
        assert_eq!(in_memory.is_some(), store.session_id().is_some());

        let db = store.db();
        let token = db.get_value(TOKEN_STORAGE_KEY).unwrap();
        let user = db.get_value(USER_STORAGE_KEY).unwrap();
        assert_eq!(token.is_some(), user.is_some());
        assert_eq!(token.is_some(), in_memory.is_some());
    }

    #[test]
    fn test_commit_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        assert!(!store.is_authenticated());

        let first_id = store.commit(session("tok-a", 1)).unwrap();
        drop(store);

        let reopened = open(&dir);
        let restored = reopened.current().expect("session restored");
        assert_eq!(restored.credential.as_str(), "tok-a");
        assert_eq!(restored.profile.id, ollie_shared::UserId(1));
        // A restore mints a new identity.
        assert_ne!(reopened.session_id(), Some(first_id));
    }

    #[test]
    fn test_commit_clear_sequences_stay_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);

        let ops: &[Option<(&str, i64)>] = &[
            Some(("a", 1)),
            Some(("b", 2)),
            None,
            None,
            Some(("c", 3)),
            None,
            Some(("d", 4)),
        ];
        for op in ops {
            match op {
                Some((token, id)) => {
                    store.commit(session(token, *id)).unwrap();
                }
                None => store.clear().unwrap(),
            }
            assert_consistent(&store);
        }
        assert!(store.restore().is_some());
        assert_consistent(&store);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_corrupt_record_restores_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut db = Database::open_in_dir(dir.path()).unwrap();
            db.put_values(&[(TOKEN_STORAGE_KEY, "tok"), (USER_STORAGE_KEY, "}{")])
                .unwrap();
        }

        let store = open(&dir);
        assert!(store.current().is_none());
        assert_consistent(&store);
        assert_eq!(store.db().get_value(TOKEN_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_refresh_profile_keeps_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        assert!(matches!(
            store.refresh_profile(SessionId::new(), profile(1, false)),
            Err(ClientError::NotAuthenticated)
        ));

        let id = store.commit(session("tok", 1)).unwrap();
        let mut edited = profile(1, false);
        edited.username = "renamed".into();
        store.refresh_profile(id, edited).unwrap();

        assert_eq!(store.session_id(), Some(id));
        assert_eq!(store.profile().unwrap().username, "renamed");
        assert_eq!(store.authorization().unwrap().1.as_str(), "tok");
        assert_consistent(&store);
    }

    #[test]
    fn test_refresh_profile_ignores_superseded_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        let old = store.commit(session("old", 1)).unwrap();
        store.commit(session("new", 2)).unwrap();

        let mut stale = profile(1, false);
        stale.username = "stale".into();
        assert!(matches!(
            store.refresh_profile(old, stale),
            Err(ClientError::NotAuthenticated)
        ));
        assert_eq!(store.profile().unwrap().id, ollie_shared::UserId(2));
        assert_eq!(store.authorization().unwrap().1.as_str(), "new");
        assert_consistent(&store);
    }

    #[test]
    fn test_invalidate_only_matching_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        let old = store.commit(session("old", 1)).unwrap();
        let new = store.commit(session("new", 1)).unwrap();

        assert!(!store.invalidate(old));
        assert!(store.is_current(new));

        assert!(store.invalidate(new));
        assert!(!store.invalidate(new));
        assert!(!store.is_authenticated());
        assert_consistent(&store);
    }

    #[test]
    fn test_subscribers_observe_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        let rx = store.subscribe();
        assert!(rx.borrow().is_none());

        store.commit(session("tok", 5)).unwrap();
        assert_eq!(rx.borrow().as_ref().map(|p| p.id), Some(ollie_shared::UserId(5)));

        store.clear().unwrap();
        assert!(rx.borrow().is_none());
    }
}
