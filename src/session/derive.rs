//! Snapshot Derivation
//!
//! Pure functions turning a backend session snapshot into the local view
//! state. Local state is always a function of the last applied snapshot.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::api::SessionSnapshot;
use crate::status::{StatusCatalog, OFFLINE_LABEL};

/// Accumulated seconds keyed by catalog status key
pub type TimerState = BTreeMap<String, u64>;

/// The agent's open session, as last reported by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    /// Display label of the status
    pub status: String,
    /// None when the backend sent no (or an unparseable) start time
    pub start_time: Option<DateTime<Utc>>,
    /// Seconds per status label, verbatim from the snapshot
    pub cumulative_durations: HashMap<String, u64>,
}

impl ActiveSession {
    /// Seconds since the session started, for live display only
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        self.start_time
            .map(|start| (now - start).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }
}

/// Everything the tracker keeps from one snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub timers: TimerState,
    pub active: Option<ActiveSession>,
}

impl Derived {
    /// Status to publish: the active label, or nothing
    pub fn status(&self) -> Option<String> {
        self.active.as_ref().map(|a| a.status.clone())
    }
}

/// Translate label-keyed durations into catalog keys; unknown labels are dropped
pub fn derive_timers(snapshot: &SessionSnapshot, catalog: &StatusCatalog) -> TimerState {
    snapshot
        .cumulative_durations
        .iter()
        .filter_map(|(label, secs)| match catalog.by_label(label) {
            Some(entry) => Some((entry.key.clone(), *secs)),
            None => {
                tracing::trace!(label = %label, "Dropping duration for unknown status label");
                None
            }
        })
        .collect()
}

/// Active session, or None when the agent is offline or has no status
pub fn derive_active(snapshot: &SessionSnapshot) -> Option<ActiveSession> {
    let status = snapshot
        .current_status
        .as_deref()
        .filter(|s| !s.is_empty() && *s != OFFLINE_LABEL)?;

    Some(ActiveSession {
        status: status.to_string(),
        start_time: snapshot.session_start_time,
        cumulative_durations: snapshot.cumulative_durations.clone(),
    })
}

pub fn derive(snapshot: &SessionSnapshot, catalog: &StatusCatalog) -> Derived {
    Derived {
        timers: derive_timers(snapshot, catalog),
        active: derive_active(snapshot),
    }
}

/// `HH:MM:SS`, hours unbounded
pub fn format_hms(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
