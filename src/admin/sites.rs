//! Site Administration
//!
//! Site CRUD plus the badge styling used wherever a site name is shown.

use std::collections::HashMap;

use super::AdminError;
use crate::api::{paths, ApiClient, ClientResult, Site, SiteInput};

/// Badge colours, cycled by the site's position in the list
pub const BADGE_COLORS: [&str; 4] = ["blue", "green", "yellow", "purple"];

pub const SITE_REQUIRED_MESSAGE: &str = "Code et nom requis";

/// Tailwind classes for a site badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteBadge {
    pub name: String,
    pub bg: String,
    pub text: String,
    pub dark_bg: String,
    pub dark_text: String,
}

impl SiteBadge {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            bg: format!("bg-{}-100", color),
            text: format!("text-{}-800", color),
            dark_bg: format!("dark:bg-{}-700", color),
            dark_text: format!("dark:text-{}-100", color),
        }
    }
}

/// Badge per site id, in list order
pub fn badge_map(sites: &[Site]) -> HashMap<String, SiteBadge> {
    sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            let color = BADGE_COLORS[i % BADGE_COLORS.len()];
            (site.id_segment(), SiteBadge::new(&site.name, color))
        })
        .collect()
}

/// Trim and require both fields before anything is sent
pub fn validate(input: &SiteInput) -> Result<SiteInput, AdminError> {
    let code = input.code.trim();
    let name = input.name.trim();
    if code.is_empty() || name.is_empty() {
        return Err(AdminError::Validation(SITE_REQUIRED_MESSAGE.to_string()));
    }
    Ok(SiteInput {
        code: code.to_string(),
        name: name.to_string(),
    })
}

pub async fn fetch_sites(client: &ApiClient) -> ClientResult<Vec<Site>> {
    client.get_json(paths::SITES).await
}

pub async fn create_site(client: &ApiClient, input: &SiteInput) -> ClientResult<()> {
    client.post(paths::SITES, input).await
}

pub async fn update_site(client: &ApiClient, site_id: &str, input: &SiteInput) -> ClientResult<()> {
    client.put(&paths::site(site_id), input).await
}

pub async fn delete_site(client: &ApiClient, site_id: &str) -> ClientResult<()> {
    client.delete(&paths::site(site_id)).await
}
