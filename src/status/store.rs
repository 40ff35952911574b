//! Status Store
//!
//! Broadcasts the agent's current status to every UI region that shows it.
//! One owner holds the store and writes; any number of readers subscribe.
//! Writes are last-write-wins: a subscriber only ever sees the latest value.

use tokio::sync::watch;

/// Current status published to the header, sidebar, etc.
#[derive(Debug)]
pub struct StatusStore {
    tx: watch::Sender<Option<String>>,
}

impl StatusStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Replace the published status
    ///
    /// Subscribers are only woken when the value actually changes.
    pub fn publish(&self, status: Option<String>) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                tracing::debug!(from = ?current, to = ?status, "Status published");
                *current = status;
                true
            }
        });
    }

    /// Latest published status
    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every subsequent change
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}
