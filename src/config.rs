//! Configuration layer: named provider accounts and adapter defaults.
//!
//! Configurations are owned by the host; this crate only reads them. A
//! `ConfigSet` holds every registered account and selects one by name
//! before a session is opened.

use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Default scope list requested when neither the caller nor the
/// configuration names any scopes.
pub const DEFAULT_SCOPES: &str = "user,public_repo,repo,repo_deployment,repo:status,delete_repo,notifications,gist,read:repo_hook,write:repo_hook,admin:repo_hook,admin:org_hook,read:org,write:org,admin:org,read:public_key,write:public_key,admin:public_key,read:gpg_key,write:gpg_key,admin:gpg_key";

/// One registered GitHub OAuth application account.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Account name used for selection among several configurations.
    pub name: String,
    /// OAuth application client id.
    pub client_id: String,
    /// OAuth application client secret.
    pub client_secret: String,
    /// Access token from a previous handshake, if the host persisted one.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Redirect URI registered with the OAuth application.
    pub callback_uri: String,
    /// Comma-separated scopes granted to this account. `None` falls back
    /// to [`DEFAULT_SCOPES`].
    #[serde(default)]
    pub scopes: Option<String>,
}

impl GithubConfig {
    /// Reads a configuration from environment variables.
    ///
    /// `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET` and `GITHUB_CALLBACK_URI`
    /// are required; `GITHUB_ACCESS_TOKEN`, `GITHUB_SCOPES` and
    /// `GITHUB_CONFIG_NAME` are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            name: optional_env("GITHUB_CONFIG_NAME").unwrap_or_else(|| "default".to_string()),
            client_id: required_env("GITHUB_CLIENT_ID")?,
            client_secret: required_env("GITHUB_CLIENT_SECRET")?,
            access_token: optional_env("GITHUB_ACCESS_TOKEN"),
            callback_uri: required_env("GITHUB_CALLBACK_URI")?,
            scopes: optional_env("GITHUB_SCOPES"),
        })
    }

    /// Scopes granted to this account, split out of the comma-separated
    /// list. Empty when no scopes were configured.
    pub fn granted_scopes(&self) -> Vec<&str> {
        self.scopes
            .as_deref()
            .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key).ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Every configuration registered with the host, selectable by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigSet {
    configs: Vec<GithubConfig>,
}

impl ConfigSet {
    pub fn new(configs: Vec<GithubConfig>) -> Self {
        Self { configs }
    }

    /// Selects the configuration registered under `name`.
    pub fn select(&self, name: &str) -> Result<&GithubConfig, ConfigError> {
        self.configs
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownConfiguration(name.to_string()))
    }
}

/// Provider constants and quota defaults the host may consult for its own
/// throttling. Quota values are informational; nothing in this crate
/// enforces them.
#[derive(Debug, Clone)]
pub struct GithubDefaults {
    /// REST API host.
    pub hostname: String,
    /// Web host used by the OAuth handshake endpoints.
    pub web_hostname: String,
    pub port: u16,
    /// Requests allowed per quota window when the provider has not said
    /// otherwise.
    pub default_remaining_requests: u64,
    /// Quota window length in seconds.
    pub default_remaining_window_secs: u64,
}

impl Default for GithubDefaults {
    fn default() -> Self {
        Self {
            hostname: "api.github.com".to_string(),
            web_hostname: "github.com".to_string(),
            port: 443,
            default_remaining_requests: 5000,
            default_remaining_window_secs: 60 * 60,
        }
    }
}
