//! Session Tracking
//!
//! Client-side mirror of the backend's per-agent session aggregates.
//!
//! ## Data Flow
//!
//! 1. `SessionTracker::refresh` fetches the live snapshot
//! 2. `derive` maps label-keyed durations to catalog keys and finds the
//!    active session
//! 3. The tracker stores the result and publishes the status to the
//!    shared `StatusStore`
//! 4. `SessionTracker::change_status` publishes optimistically, closes the
//!    old session, opens the new one and goes back to step 1

mod backend;
mod derive;
mod tracker;

pub use backend::SessionBackend;
pub use derive::{derive, derive_active, derive_timers, format_hms, ActiveSession, Derived, TimerState};
pub use tracker::{
    ChangeOutcome, RefreshOutcome, SessionTracker, TrackerState, START_FAILED_MESSAGE,
};
