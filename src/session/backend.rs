//! Session Backend Port
//!
//! The three session calls the tracker needs, behind a trait so the
//! coordinator can run against the real API or an in-memory double.

use async_trait::async_trait;

use crate::api::{
    paths, ApiClient, ClientResult, CloseSessionRequest, SessionSnapshot, StartSessionRequest,
    UserId,
};
use crate::status::PauseKind;

#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Live snapshot; `None` when the backend answers with an empty body
    async fn live_session(&self, user_id: &UserId) -> ClientResult<Option<SessionSnapshot>>;

    /// Close whatever session is open for the user
    async fn close_session(&self, user_id: &UserId) -> ClientResult<()>;

    /// Open a new session with the given status label
    async fn start_session(
        &self,
        user_id: &UserId,
        status: &str,
        pause: Option<PauseKind>,
    ) -> ClientResult<()>;
}

#[async_trait]
impl SessionBackend for ApiClient {
    async fn live_session(&self, user_id: &UserId) -> ClientResult<Option<SessionSnapshot>> {
        self.get_optional_json(&paths::live_session(user_id)).await
    }

    async fn close_session(&self, user_id: &UserId) -> ClientResult<()> {
        let body = CloseSessionRequest {
            user_id: user_id.clone(),
        };
        self.post(paths::SESSION_CLOSE, &body).await
    }

    async fn start_session(
        &self,
        user_id: &UserId,
        status: &str,
        pause: Option<PauseKind>,
    ) -> ClientResult<()> {
        let body = StartSessionRequest {
            user_id: user_id.clone(),
            status: status.to_string(),
            pause_type: pause,
        };
        self.post(paths::SESSION_START, &body).await
    }
}
