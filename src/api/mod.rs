//! Backend API
//!
//! HTTP client for the dashboard backend plus the typed endpoint wrappers
//! the rest of the crate calls.
//!
//! # Endpoints
//!
//! ## Sessions
//! - `GET /session_agents/user/live/{userId}` - Live session snapshot
//! - `POST /session_agents/close` - Close the agent's open session
//! - `POST /session_agents/start` - Open a session with a status
//!
//! ## Sales
//! - `GET /sales/monthly-agents-charthorizontal` - Weekly sales per agent
//!
//! ## Users
//! - `GET /users/me` - Current profile
//! - `GET /users` - Paged user list
//! - `DELETE /users/{id}/delete-users` - Delete (or deactivate) an agent
//! - `PUT /users/{id}/toggle-active` - Lock or unlock an agent account
//!
//! ## Sites
//! - `GET /sites`, `POST /sites`, `PUT /sites/{id}`, `DELETE /sites/{id}`

pub mod client;
pub mod dto;
pub mod error;

pub use client::{ApiClient, ClientConfig};
pub use dto::{
    parse_timestamp, CloseSessionRequest, DeleteResponse, RawWeeklySales, Role, SessionSnapshot,
    SetActiveRequest, Site, SiteInput, StartSessionRequest, User, UserId, UserQuery,
    UsersResponse,
};
pub use error::{ClientError, ClientResult};

/// Backend paths
pub mod paths {
    use super::UserId;

    pub const SESSION_CLOSE: &str = "/session_agents/close";
    pub const SESSION_START: &str = "/session_agents/start";
    pub const MONTHLY_SALES: &str = "/sales/monthly-agents-charthorizontal";
    pub const CURRENT_USER: &str = "/users/me";
    pub const USERS: &str = "/users";
    pub const SITES: &str = "/sites";

    pub fn live_session(user_id: &UserId) -> String {
        format!("/session_agents/user/live/{}", user_id)
    }

    pub fn delete_user(user_id: &UserId) -> String {
        format!("/users/{}/delete-users", user_id)
    }

    pub fn toggle_active(user_id: &UserId) -> String {
        format!("/users/{}/toggle-active", user_id)
    }

    pub fn site(id: &str) -> String {
        format!("/sites/{}", id)
    }
}
