//! Transient Notifications
//!
//! Toast-style messages raised by the coordinators. Whatever renders the
//! dashboard subscribes and shows them; nothing here blocks on delivery.

use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;

/// Capacity of the notification channel; slow subscribers lose the oldest
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Error => "✕",
        };
        write!(f, "{} {}", icon, self.message)
    }
}

/// Fan-out of notifications to any number of listeners
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        let notification = Notification {
            level,
            message: message.into(),
        };
        tracing::debug!(level = ?notification.level, message = %notification.message, "Notification");
        // No listener is fine: the message is simply dropped
        let _ = self.tx.send(notification);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
