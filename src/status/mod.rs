//! Agent Status
//!
//! - **Catalog**: known statuses, their labels and categories
//! - **Store**: publish-subscribe holder of the current status

mod catalog;
mod store;

pub use catalog::{PauseKind, StatusCatalog, StatusCategory, StatusEntry, OFFLINE_LABEL};
pub use store::StatusStore;
