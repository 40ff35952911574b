//! Administration
//!
//! User and site management for Admin / SuperAdmin accounts.
//!
//! - **Confirm**: port for "are you sure?" dialogs
//! - **Users**: profile, agent list, delete-or-deactivate
//! - **Sites**: CRUD and badge styling
//! - **AdminPanel**: the settings tab tying them to notifications

mod confirm;
mod panel;
pub mod sites;
pub mod users;

pub use confirm::{Confirm, ConfirmPrompt, FixedAnswer};
pub use panel::{ActionOutcome, AdminPanel};
pub use sites::SiteBadge;
pub use users::DeleteOutcome;

use crate::api::ClientError;

/// Errors surfaced by admin operations
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Rejected client-side, nothing was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The signed-in role may not perform this action
    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}
