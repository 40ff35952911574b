//! # AgentDesk
//!
//! Client core of a call-center admin dashboard: live agent session
//! tracking, status changes, the monthly sales ranking, user and site
//! administration, and persisted UI preferences.
//!
//! ## Modules
//!
//! - [`api`]: REST client and wire types for the dashboard backend
//! - [`status`]: status catalog and the shared status store
//! - [`session`]: session reconciliation and the status-change flow
//! - [`dashboard`]: sales ranking widget
//! - [`admin`]: agent and site management
//! - [`prefs`]: key-value persisted preferences
//! - [`shell`]: role-gated navigation and header state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agentdesk::api::{ApiClient, ClientConfig, UserId};
//! use agentdesk::notify::Notifier;
//! use agentdesk::session::SessionTracker;
//! use agentdesk::status::{PauseKind, StatusCatalog, StatusStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(ClientConfig::default())?;
//!     let tracker = SessionTracker::new(
//!         Arc::new(client),
//!         StatusCatalog::default(),
//!         Arc::new(StatusStore::new()),
//!         Notifier::new(),
//!         Some(UserId::from(42)),
//!     );
//!
//!     tracker.refresh_current().await;
//!     tracker.change_status("Pause", Some(PauseKind::Lunch)).await;
//!
//!     println!("{:?}", tracker.state().await.timers);
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod notify;
pub mod prefs;
pub mod session;
pub mod shell;
pub mod status;

pub use api::{ApiClient, ClientConfig, ClientError, UserId};
pub use config::Config;
pub use notify::{Notification, NotificationLevel, Notifier};
pub use prefs::{KeyValueStore, Preferences};
pub use session::{SessionBackend, SessionTracker};
pub use shell::{NavItem, Shell};
pub use status::{PauseKind, StatusCatalog, StatusStore};
