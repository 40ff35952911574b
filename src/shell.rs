//! Page Shell
//!
//! Role-gated page frame: sidebar navigation (persisted), header state fed by
//! the session tracker, and logout.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::Role;
use crate::prefs::{Preferences, PrefsError};
use crate::session::{ActiveSession, RefreshOutcome, SessionTracker, TimerState};

/// Sidebar entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavItem {
    Dashboard,
    Administration,
    Settings,
}

impl NavItem {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavItem::Dashboard => "dashboard",
            NavItem::Administration => "administration",
            NavItem::Settings => "settings",
        }
    }

    /// Entries shown for a role, in sidebar order
    pub fn visible_for(role: &Role) -> Vec<NavItem> {
        if role.is_admin_or_super_admin() {
            vec![NavItem::Dashboard, NavItem::Administration, NavItem::Settings]
        } else {
            vec![NavItem::Dashboard]
        }
    }
}

impl fmt::Display for NavItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(NavItem::Dashboard),
            "administration" => Ok(NavItem::Administration),
            "settings" => Ok(NavItem::Settings),
            other => Err(format!(
                "Unknown page: {}. Use: dashboard, administration, settings",
                other
            )),
        }
    }
}

/// Everything the header renders
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub status: Option<String>,
    pub timers: TimerState,
    pub current_session: Option<ActiveSession>,
    pub active_page: NavItem,
}

/// Frame around the dashboard pages for one signed-in user
pub struct Shell {
    prefs: Preferences,
    tracker: Arc<SessionTracker>,
    role: Role,
}

impl Shell {
    pub fn new(prefs: Preferences, tracker: Arc<SessionTracker>, role: Role) -> Self {
        Self {
            prefs,
            tracker,
            role,
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn tracker(&self) -> &Arc<SessionTracker> {
        &self.tracker
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn visible_items(&self) -> Vec<NavItem> {
        NavItem::visible_for(&self.role)
    }

    /// Restored page; unknown or forbidden entries fall back to the dashboard
    pub fn active_item(&self) -> NavItem {
        self.prefs
            .active_item()
            .parse()
            .ok()
            .filter(|item| self.visible_items().contains(item))
            .unwrap_or(NavItem::Dashboard)
    }

    /// Switch page and remember it
    pub fn select(&self, item: NavItem) -> Result<NavItem, PrefsError> {
        if !self.visible_items().contains(&item) {
            tracing::warn!(page = %item, role = %self.role, "Page not available for role");
            return Ok(self.active_item());
        }
        self.prefs.set_active_item(item.as_str())?;
        Ok(item)
    }

    /// First reconciliation when the shell appears
    pub async fn mount(&self) -> RefreshOutcome {
        self.tracker.refresh_current().await
    }

    pub async fn header(&self) -> HeaderView {
        let state = self.tracker.state().await;
        HeaderView {
            status: self.tracker.store().current(),
            timers: state.timers,
            current_session: state.current_session,
            active_page: self.active_item(),
        }
    }

    pub async fn logout(&self) {
        self.tracker.logout().await;
    }
}
