//! Administration Panel
//!
//! Settings tab state: current profile, agent list and sites, with the
//! confirm-then-call-then-notify flow around every write. All failures end
//! as a log line and/or a notification; nothing propagates further.

use std::collections::HashMap;
use std::sync::Arc;

use super::confirm::{Confirm, ConfirmPrompt};
use super::sites::{self, SiteBadge};
use super::users::{self, DeleteOutcome};
use super::AdminError;
use crate::api::{ApiClient, Role, Site, SiteInput, User, UserId, UserQuery};
use crate::notify::Notifier;

/// Result of a guarded write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome<T = ()> {
    Cancelled,
    Done(T),
    Failed,
}

pub struct AdminPanel {
    client: ApiClient,
    notifier: Notifier,
    confirm: Arc<dyn Confirm>,
    current_user: Option<User>,
    agents: Vec<User>,
    sites: Vec<Site>,
    site_badges: HashMap<String, SiteBadge>,
}

impl AdminPanel {
    pub fn new(client: ApiClient, notifier: Notifier, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            client,
            notifier,
            confirm,
            current_user: None,
            agents: Vec::new(),
            sites: Vec::new(),
            site_badges: HashMap::new(),
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn agents(&self) -> &[User] {
        &self.agents
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site_badge(&self, site_id: &str) -> Option<&SiteBadge> {
        self.site_badges.get(site_id)
    }

    fn role(&self) -> Option<&Role> {
        self.current_user.as_ref().map(|u| &u.role)
    }

    /// Agent management is for Admin and SuperAdmin
    pub fn can_manage_agents(&self) -> bool {
        self.role().is_some_and(Role::is_admin_or_super_admin)
    }

    /// Site management is SuperAdmin only
    pub fn can_manage_sites(&self) -> bool {
        matches!(self.role(), Some(Role::SuperAdmin))
    }

    fn require_agents(&self) -> Result<(), AdminError> {
        if self.can_manage_agents() {
            Ok(())
        } else {
            Err(AdminError::Forbidden("agent management".to_string()))
        }
    }

    fn require_sites(&self) -> Result<(), AdminError> {
        if self.can_manage_sites() {
            Ok(())
        } else {
            Err(AdminError::Forbidden("site management".to_string()))
        }
    }

    /// Load the signed-in profile, then whatever the role allows
    pub async fn load(&mut self) -> Result<(), AdminError> {
        match users::fetch_current_user(&self.client).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "Profile loaded");
                self.current_user = Some(user);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load profile");
                self.notifier.error("Impossible de charger votre profil");
                return Err(e.into());
            }
        }

        if self.can_manage_agents() {
            self.refresh_agents().await;
        }
        if self.can_manage_sites() {
            self.refresh_sites().await;
        }
        Ok(())
    }

    /// Reload the agent list; the previous list is kept on failure
    pub async fn refresh_agents(&mut self) -> bool {
        if !self.can_manage_agents() {
            return false;
        }
        match users::fetch_users(&self.client, &UserQuery::default()).await {
            Ok(agents) => {
                tracing::debug!(count = agents.len(), "Agents loaded");
                self.agents = agents;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load agents");
                false
            }
        }
    }

    /// Reload sites and rebuild their badges
    pub async fn refresh_sites(&mut self) -> bool {
        if !self.can_manage_sites() {
            return false;
        }
        match sites::fetch_sites(&self.client).await {
            Ok(list) => {
                self.site_badges = sites::badge_map(&list);
                self.sites = list;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load sites");
                self.notifier.error("Impossible de charger les sites");
                false
            }
        }
    }

    /// Delete an agent after confirmation
    pub async fn delete_agent(
        &mut self,
        agent_id: &UserId,
    ) -> Result<ActionOutcome<DeleteOutcome>, AdminError> {
        self.require_agents()?;

        let agent = self.agents.iter().find(|a| &a.id == agent_id);
        let prompt =
            ConfirmPrompt::delete(users::delete_title(agent)).with_text(users::DELETE_AGENT_TEXT);
        if !self.confirm.confirm(&prompt).await {
            return Ok(ActionOutcome::Cancelled);
        }

        match users::delete_user(&self.client, agent_id).await {
            Ok(outcome) => {
                tracing::info!(agent_id = %agent_id, outcome = ?outcome, "Agent delete handled");
                match &outcome {
                    DeleteOutcome::Deactivated(m) => self.notifier.info(m.as_str()),
                    DeleteOutcome::Deleted(m) | DeleteOutcome::Done(m) => {
                        self.notifier.success(m.as_str())
                    }
                }
                self.refresh_agents().await;
                Ok(ActionOutcome::Done(outcome))
            }
            Err(e) => {
                tracing::error!(agent_id = %agent_id, error = %e, "Failed to delete agent");
                let message = e
                    .user_message()
                    .unwrap_or(users::DELETE_FAILED_MESSAGE)
                    .to_string();
                self.notifier.error(message);
                Ok(ActionOutcome::Failed)
            }
        }
    }

    /// Lock an active agent or unlock a locked one
    ///
    /// Returns the new `active` value. Agents missing from the loaded list
    /// are treated as active.
    pub async fn toggle_agent_active(
        &mut self,
        agent_id: &UserId,
    ) -> Result<ActionOutcome<bool>, AdminError> {
        self.require_agents()?;

        let active = self
            .agents
            .iter()
            .find(|a| &a.id == agent_id)
            .map_or(true, User::is_active);
        let wanted = !active;

        match users::set_user_active(&self.client, agent_id, wanted).await {
            Ok(()) => {
                tracing::info!(agent_id = %agent_id, active = wanted, "Agent account toggled");
                self.notifier.success(if wanted {
                    users::UNLOCKED_MESSAGE
                } else {
                    users::LOCKED_MESSAGE
                });
                self.refresh_agents().await;
                Ok(ActionOutcome::Done(wanted))
            }
            Err(e) => {
                tracing::error!(agent_id = %agent_id, error = %e, "Failed to toggle agent account");
                let message = e
                    .user_message()
                    .unwrap_or(users::TOGGLE_FAILED_MESSAGE)
                    .to_string();
                self.notifier.error(message);
                Ok(ActionOutcome::Failed)
            }
        }
    }

    /// Create a site; invalid input is rejected before any request
    pub async fn add_site(&mut self, input: &SiteInput) -> Result<ActionOutcome, AdminError> {
        self.require_sites()?;
        let input = sites::validate(input)?;

        match sites::create_site(&self.client, &input).await {
            Ok(()) => {
                tracing::info!(code = %input.code, "Site created");
                self.notifier.success("Site ajouté");
                self.refresh_sites().await;
                Ok(ActionOutcome::Done(()))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create site");
                self.notifier.error("Erreur lors de l'ajout du site");
                Ok(ActionOutcome::Failed)
            }
        }
    }

    pub async fn edit_site(
        &mut self,
        site_id: &str,
        input: &SiteInput,
    ) -> Result<ActionOutcome, AdminError> {
        self.require_sites()?;
        let input = sites::validate(input)?;

        match sites::update_site(&self.client, site_id, &input).await {
            Ok(()) => {
                tracing::info!(site_id = %site_id, "Site updated");
                self.notifier.success("Site modifié");
                self.refresh_sites().await;
                Ok(ActionOutcome::Done(()))
            }
            Err(e) => {
                tracing::error!(site_id = %site_id, error = %e, "Failed to update site");
                self.notifier.error("Erreur lors de la modification du site");
                Ok(ActionOutcome::Failed)
            }
        }
    }

    pub async fn delete_site(&mut self, site_id: &str) -> Result<ActionOutcome, AdminError> {
        self.require_sites()?;

        if !self.confirm.confirm(&ConfirmPrompt::delete("Supprimer ce site ?")).await {
            return Ok(ActionOutcome::Cancelled);
        }

        match sites::delete_site(&self.client, site_id).await {
            Ok(()) => {
                tracing::info!(site_id = %site_id, "Site deleted");
                self.notifier.success("Site supprimé");
                self.refresh_sites().await;
                Ok(ActionOutcome::Done(()))
            }
            Err(e) => {
                tracing::error!(site_id = %site_id, error = %e, "Failed to delete site");
                self.notifier.error("Erreur lors de la suppression du site");
                Ok(ActionOutcome::Failed)
            }
        }
    }
}
