//! Configuration System
//!
//! Loads the backend connection, signed-in agent, preferences location and
//! logging settings from a TOML file, with environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::{ClientConfig, UserId};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub agent: AgentSection,

    #[serde(default)]
    pub preferences: PreferencesSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token obtained at login
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Signed-in agent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentSection {
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Where UI preferences are persisted
#[derive(Debug, Clone, Deserialize)]
pub struct PreferencesSection {
    #[serde(default = "default_preferences_path")]
    pub path: String,
}

fn default_preferences_path() -> String {
    dirs::config_dir()
        .map(|p| {
            p.join("agentdesk")
                .join("preferences.json")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "./agentdesk_preferences.json".to_string())
}

impl Default for PreferencesSection {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Defaults plus environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("agentdesk").join("config.toml")),
            Some(PathBuf::from("./agentdesk.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the process environment in practice)
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("AGENTDESK_API_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = lookup("AGENTDESK_TOKEN") {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(user_id) = lookup("AGENTDESK_USER_ID") {
            self.agent.user_id = Some(UserId::new(user_id)).filter(|id| !id.is_empty());
        }
        if let Some(level) = lookup("AGENTDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("AGENTDESK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Client settings for [`crate::api::ApiClient`]
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            token: self.api.token.clone(),
            request_timeout_secs: self.api.request_timeout_secs,
        }
    }

    /// Preferences file, with a leading `~/` expanded
    pub fn preferences_path(&self) -> PathBuf {
        match (self.preferences.path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.preferences.path),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.agent.user_id.as_ref().filter(|id| !id.is_empty())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# AgentDesk Configuration
#
# Environment variables override these settings:
# - AGENTDESK_API_URL
# - AGENTDESK_TOKEN
# - AGENTDESK_USER_ID
# - AGENTDESK_LOG_LEVEL
# - AGENTDESK_LOG_FORMAT

[api]
# Dashboard backend base URL
base_url = "http://localhost:5000/api"

# Bearer token from the login page
# token = "..."

# Per-request timeout (seconds)
request_timeout_secs = 30

[agent]
# Signed-in agent; session tracking is skipped when unset
# user_id = 42

[preferences]
# JSON file holding theme, dark mode and the active page
path = "~/.config/agentdesk/preferences.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty, json
format = "pretty"
"#
    .to_string()
}
