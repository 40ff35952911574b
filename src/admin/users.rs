//! User Administration
//!
//! Profile lookup, the agent list, account locking and agent deletion. The
//! backend deletes an
//! agent only if nothing references it; otherwise it deactivates the agent and
//! says so in the response message, so deletion outcomes are classified from
//! the message text.

use crate::api::{
    paths, ApiClient, ClientResult, DeleteResponse, SetActiveRequest, User, UserId, UserQuery,
    UsersResponse,
};

/// Explanation shown in the delete confirmation
pub const DELETE_AGENT_TEXT: &str =
    "L'agent sera supprimé si aucune donnée liée n’existe, sinon il sera simplement désactivé.";

/// Fallback success message when the server sends none
pub const DELETE_FALLBACK_MESSAGE: &str = "Suppression effectuée";

pub const DELETE_FAILED_MESSAGE: &str = "Erreur lors de la suppression";

pub const LOCKED_MESSAGE: &str = "Compte verrouillé";
pub const UNLOCKED_MESSAGE: &str = "Compte déverrouillé";
pub const TOGGLE_FAILED_MESSAGE: &str = "Erreur lors du changement de statut";

/// How the server handled a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Agent had linked data and was only deactivated
    Deactivated(String),
    /// Agent row was removed
    Deleted(String),
    /// Success without a recognisable message
    Done(String),
}

impl DeleteOutcome {
    pub fn message(&self) -> &str {
        match self {
            DeleteOutcome::Deactivated(m) | DeleteOutcome::Deleted(m) | DeleteOutcome::Done(m) => m,
        }
    }
}

/// Classify a delete response by its message (case-insensitive)
pub fn classify_delete(response: &DeleteResponse) -> DeleteOutcome {
    let message = response
        .message
        .as_deref()
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    match message {
        Some(m) if m.to_lowercase().contains("désactivé") => DeleteOutcome::Deactivated(m),
        Some(m) if m.to_lowercase().contains("supprimé") => DeleteOutcome::Deleted(m),
        Some(m) => DeleteOutcome::Done(m),
        None => DeleteOutcome::Done(DELETE_FALLBACK_MESSAGE.to_string()),
    }
}

/// Title of the delete confirmation for `agent`
pub fn delete_title(agent: Option<&User>) -> String {
    let who = agent
        .and_then(User::display_name)
        .unwrap_or_else(|| "cet agent".to_string());
    format!("Supprimer {}", who)
}

/// `GET /users/me`
pub async fn fetch_current_user(client: &ApiClient) -> ClientResult<User> {
    client.get_json(paths::CURRENT_USER).await
}

/// `GET /users` with filters
pub async fn fetch_users(client: &ApiClient, query: &UserQuery) -> ClientResult<Vec<User>> {
    let response: UsersResponse = client.get_json_with_query(paths::USERS, query).await?;
    Ok(response.into_users())
}

/// Label of the lock/unlock action for an agent in the given state
pub fn toggle_label(active: bool) -> &'static str {
    if active {
        "Verrouiller le compte"
    } else {
        "Déverrouiller le compte"
    }
}

/// `PUT /users/{id}/toggle-active`
pub async fn set_user_active(client: &ApiClient, user_id: &UserId, active: bool) -> ClientResult<()> {
    client
        .put(&paths::toggle_active(user_id), &SetActiveRequest { active })
        .await
}

/// `DELETE /users/{id}/delete-users`
pub async fn delete_user(client: &ApiClient, user_id: &UserId) -> ClientResult<DeleteOutcome> {
    let response: DeleteResponse = client.delete_json(&paths::delete_user(user_id)).await?;
    Ok(classify_delete(&response))
}
