//! Like/unlike state for the tricks and replies shown by one view.
//!
//! Counts are never adjusted locally: they come from the last-known seed, a
//! status fetch, or the server's reply to a toggle. While a toggle is in
//! flight for a key, further toggles for it are dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ollie_shared::policy;
use ollie_shared::protocol::UpvoteStatus;
use ollie_shared::{EntityKey, SessionId};
use tracing::{debug, warn};

use crate::error::Result;
use crate::http::RequestAuthenticator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TogglePhase {
    #[default]
    Idle,
    Pending,
    Settled,
    Failed,
}

/// Values a view already had before mounting, typically from a list payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LastKnown {
    pub count: u32,
    pub upvoted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EngagementState {
    upvoted: bool,
    count: u32,
    phase: TogglePhase,
    // Bumped whenever a toggle result is applied, so a status fetch issued
    // earlier cannot overwrite it.
    revision: u64,
}

impl EngagementState {
    fn seeded(last_known: LastKnown) -> Self {
        Self {
            upvoted: last_known.upvoted,
            count: last_known.count,
            ..Self::default()
        }
    }

    pub fn upvoted(&self) -> bool {
        self.upvoted
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn phase(&self) -> TogglePhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == TogglePhase::Pending
    }

    fn adopt(&mut self, status: UpvoteStatus) {
        self.upvoted = status.upvoted;
        self.count = status.upvote_count;
    }
}

/// What a view renders for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementView {
    pub upvoted: bool,
    pub count: u32,
    pub pending: bool,
    /// Whether the like control accepts input right now.
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Unmounted,
    NotAuthenticated,
    AlreadyPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server's answer was adopted.
    Applied(EngagementView),
    /// Nothing was sent.
    Dropped(DropReason),
    /// The answer arrived after the session or the view it was meant for had
    /// gone away and was ignored.
    Discarded,
}

pub struct EngagementController {
    api: Arc<RequestAuthenticator>,
    states: Mutex<HashMap<EntityKey, EngagementState>>,
    mounted: AtomicBool,
}

impl EngagementController {
    pub fn new(api: Arc<RequestAuthenticator>) -> Self {
        Self {
            api,
            states: Mutex::new(HashMap::new()),
            mounted: AtomicBool::new(true),
        }
    }

    /// Seed `key` from `last_known`, then refresh it from the backend when a
    /// user is logged in.
    ///
    /// A failed refresh keeps the seed and returns the error. A key with a
    /// toggle in flight is left alone; the toggle's reply settles it.
    pub async fn initialize(&self, key: EntityKey, last_known: LastKnown) -> Result<EngagementView> {
        let revision = {
            let mut states = self.states();
            let state = states.entry(key).or_default();
            if state.is_pending() {
                debug!(%key, "toggle in flight, keeping current engagement state");
                let snapshot = state.clone();
                drop(states);
                return Ok(self.render(&snapshot));
            }
            let revision = state.revision;
            *state = EngagementState {
                revision,
                ..EngagementState::seeded(last_known)
            };
            revision
        };

        if !policy::can_engage(self.api.session().profile().as_ref()) {
            debug!(%key, "read-only engagement view");
            return Ok(self.render(&EngagementState::seeded(last_known)));
        }

        let response = self
            .api
            .get::<UpvoteStatus>(&status_path(key))
            .await?;

        let mut states = self.states();
        let Some(state) = states.get_mut(&key) else {
            return Ok(self.render(&EngagementState::seeded(last_known)));
        };
        if self.accepts(response.issued_under) && state.revision == revision && !state.is_pending() {
            state.adopt(response.data);
        } else {
            debug!(%key, "stale upvote status ignored");
        }
        let snapshot = state.clone();
        drop(states);
        Ok(self.render(&snapshot))
    }

    /// Flip the like state of `key` on the backend.
    pub async fn toggle(&self, key: EntityKey) -> Result<ToggleOutcome> {
        if !self.is_mounted() {
            return Ok(ToggleOutcome::Dropped(DropReason::Unmounted));
        }
        // The request goes out under this credential even if the session
        // changes before dispatch.
        let authorization = self.api.session().authorization();
        let Some(authorization) = authorization
            .filter(|_| policy::can_engage(self.api.session().profile().as_ref()))
        else {
            return Ok(ToggleOutcome::Dropped(DropReason::NotAuthenticated));
        };

        let previous = {
            let mut states = self.states();
            let state = states.entry(key).or_default();
            if state.is_pending() {
                debug!(%key, "toggle dropped, one already in flight");
                return Ok(ToggleOutcome::Dropped(DropReason::AlreadyPending));
            }
            std::mem::replace(&mut state.phase, TogglePhase::Pending)
        };

        let result = self
            .api
            .post_as::<(), UpvoteStatus>(&toggle_path(key), None, authorization)
            .await;

        let mut states = self.states();
        let Some(state) = states.get_mut(&key) else {
            return Ok(ToggleOutcome::Discarded);
        };

        match result {
            Ok(response) if self.accepts(response.issued_under) => {
                state.adopt(response.data);
                state.phase = TogglePhase::Settled;
                state.revision += 1;
                let snapshot = state.clone();
                drop(states);
                debug!(%key, upvoted = snapshot.upvoted, count = snapshot.count, "toggle applied");
                Ok(ToggleOutcome::Applied(self.render(&snapshot)))
            }
            Ok(_) => {
                state.phase = previous;
                debug!(%key, "late toggle response discarded");
                Ok(ToggleOutcome::Discarded)
            }
            Err(e) => {
                state.phase = if self.is_mounted() {
                    TogglePhase::Failed
                } else {
                    previous
                };
                warn!(%key, error = %e, "toggle failed");
                Err(e)
            }
        }
    }

    pub fn view(&self, key: EntityKey) -> Option<EngagementView> {
        let state = self.states().get(&key).cloned()?;
        Some(self.render(&state))
    }

    pub fn state(&self, key: EntityKey) -> Option<EngagementState> {
        self.states().get(&key).cloned()
    }

    /// Mark the owning view as gone. Responses arriving afterwards are ignored.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Whether a response issued under `issued_under` may still be applied.
    fn accepts(&self, issued_under: Option<SessionId>) -> bool {
        self.is_mounted()
            && issued_under.is_some_and(|id| self.api.session().is_current(id))
    }

    fn render(&self, state: &EngagementState) -> EngagementView {
        let can_engage = policy::can_engage(self.api.session().profile().as_ref());
        EngagementView {
            upvoted: state.upvoted,
            count: state.count,
            pending: state.is_pending(),
            interactive: can_engage && !state.is_pending(),
        }
    }

    fn states(&self) -> MutexGuard<'_, HashMap<EntityKey, EngagementState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn status_path(key: EntityKey) -> String {
    format!("/{}/{}/upvote-status", key.kind.collection(), key.id)
}

fn toggle_path(key: EntityKey) -> String {
    format!("/{}/{}/upvote", key.kind.collection(), key.id)
}
