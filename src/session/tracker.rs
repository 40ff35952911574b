//! Session Tracker
//!
//! Reconciles local timer state with the backend's live session snapshot and
//! coordinates status changes (close the old session, open the new one,
//! reconcile).
//!
//! Status changes are optimistic: the new status is published before the
//! backend is called and is never rolled back. Every refresh and every change
//! takes a ticket from a monotonic counter; a snapshot is only applied if its
//! refresh still holds the newest ticket when the response lands, so a slow
//! earlier refresh cannot overwrite newer state.
//!
//! While a change is between its optimistic publish and the end of its start
//! call, refreshes are discarded too: the backend can still report the old
//! session (or none) until the new one is open.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::backend::SessionBackend;
use super::derive::{derive, ActiveSession, TimerState};
use crate::api::UserId;
use crate::notify::Notifier;
use crate::status::{PauseKind, StatusCatalog, StatusStore};

/// Toast shown when a new session cannot be opened
pub const START_FAILED_MESSAGE: &str = "Erreur démarrage session !";

/// Local view of the agent's session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    /// Status reported by the last applied snapshot
    pub status: Option<String>,
    pub timers: TimerState,
    pub current_session: Option<ActiveSession>,
    /// When the last snapshot was applied
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// What a refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No user id
    Skipped,
    /// Backend returned nothing; previous state kept
    Empty,
    /// Snapshot applied; `active` tells whether a session is open
    Applied { active: bool },
    /// A newer refresh or status change started meanwhile; response dropped
    Stale,
    /// Request failed; previous state kept
    Failed,
}

/// What a status change did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Published locally only, no user to persist for
    LocalOnly,
    /// New session opened, followed by a reconciliation
    Persisted(RefreshOutcome),
    /// Opening the new session failed; the optimistic status stays
    StartFailed,
}

/// Coordinates session state for one signed-in agent
pub struct SessionTracker {
    backend: Arc<dyn SessionBackend>,
    catalog: StatusCatalog,
    store: Arc<StatusStore>,
    notifier: Notifier,
    user_id: Option<UserId>,
    state: RwLock<TrackerState>,
    sequence: AtomicU64,
    /// Status changes whose start call has not returned yet
    pending: AtomicU64,
}

/// Marks a status change in flight until dropped
struct PendingChange<'a>(&'a AtomicU64);

impl<'a> PendingChange<'a> {
    fn enter(counter: &'a AtomicU64) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingChange<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionTracker {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        catalog: StatusCatalog,
        store: Arc<StatusStore>,
        notifier: Notifier,
        user_id: Option<UserId>,
    ) -> Self {
        Self {
            backend,
            catalog,
            store,
            notifier,
            user_id: user_id.filter(|id| !id.is_empty()),
            state: RwLock::new(TrackerState::default()),
            sequence: AtomicU64::new(0),
            pending: AtomicU64::new(0),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn catalog(&self) -> &StatusCatalog {
        &self.catalog
    }

    /// Shared store the tracker publishes to
    pub fn store(&self) -> &Arc<StatusStore> {
        &self.store
    }

    /// Copy of the current local state
    pub async fn state(&self) -> TrackerState {
        self.state.read().await.clone()
    }

    fn next_ticket(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket
    }

    fn change_in_flight(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    /// Reconcile with the signed-in agent's live session
    pub async fn refresh_current(&self) -> RefreshOutcome {
        let user_id = self.user_id.clone();
        self.refresh(user_id.as_ref()).await
    }

    /// Fetch the live snapshot for `user_id` and re-derive local state from it
    pub async fn refresh(&self, user_id: Option<&UserId>) -> RefreshOutcome {
        let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
            return RefreshOutcome::Skipped;
        };

        let ticket = self.next_ticket();
        let started_mid_change = self.change_in_flight();

        let snapshot = match self.backend.live_session(user_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::debug!(user_id = %user_id, "Live session endpoint returned no data");
                return RefreshOutcome::Empty;
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to fetch live session");
                return RefreshOutcome::Failed;
            }
        };

        let derived = derive(&snapshot, &self.catalog);

        let mut state = self.state.write().await;
        if !self.is_latest(ticket) || started_mid_change || self.change_in_flight() {
            tracing::debug!(user_id = %user_id, ticket, "Discarding stale session snapshot");
            return RefreshOutcome::Stale;
        }

        let status = derived.status();
        let active = derived.active.is_some();

        state.status = status.clone();
        state.timers = derived.timers;
        state.current_session = derived.active;
        state.last_refreshed = Some(Utc::now());
        self.store.publish(status);

        tracing::debug!(
            user_id = %user_id,
            status = ?state.status,
            timers = state.timers.len(),
            "Session state reconciled"
        );

        RefreshOutcome::Applied { active }
    }

    /// Switch the agent to `new_status` (a display label)
    ///
    /// Publishes immediately, then closes the previous session and opens the
    /// new one, strictly in that order, then reconciles. Refreshes that land
    /// before the start call returns are discarded.
    pub async fn change_status(&self, new_status: &str, pause: Option<PauseKind>) -> ChangeOutcome {
        let in_flight = {
            // Under the state lock so an in-flight refresh cannot interleave.
            // The pending mark goes up before the ticket so any refresh with a
            // newer ticket sees it.
            let _state = self.state.write().await;
            let in_flight = self
                .user_id
                .as_ref()
                .map(|_| PendingChange::enter(&self.pending));
            self.next_ticket();
            self.store.publish(Some(new_status.to_string()));
            in_flight
        };

        let Some(user_id) = self.user_id.clone() else {
            tracing::debug!(status = %new_status, "No user signed in, status kept local");
            return ChangeOutcome::LocalOnly;
        };

        self.close_previous(&user_id).await;

        let started = self.backend.start_session(&user_id, new_status, pause).await;
        drop(in_flight);

        match started {
            Ok(()) => {
                tracing::info!(user_id = %user_id, status = %new_status, pause = ?pause, "Session started");
                ChangeOutcome::Persisted(self.refresh(Some(&user_id)).await)
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, status = %new_status, error = %e, "Failed to start session");
                self.notifier.error(START_FAILED_MESSAGE);
                ChangeOutcome::StartFailed
            }
        }
    }

    /// Best-effort close of the previous session; never fails the caller
    async fn close_previous(&self, user_id: &UserId) {
        if let Err(e) = self.backend.close_session(user_id).await {
            // Usually just "no open session"
            tracing::warn!(user_id = %user_id, error = %e, "Previous session not closed (ignored)");
        }
    }

    /// Sign-out: close the session if any and drop all local state
    pub async fn logout(&self) {
        if let Some(user_id) = self.user_id.clone() {
            self.close_previous(&user_id).await;
        }

        let mut state = self.state.write().await;
        self.next_ticket();
        *state = TrackerState::default();
        self.store.publish(None);

        tracing::info!(user_id = ?self.user_id, "Agent logged out");
    }
}
