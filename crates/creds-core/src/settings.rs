//! Settings for secret access
//!
//! Resolved in order: built-in defaults, a JSON settings file, then
//! environment variables.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CredsError, Result};

/// Default Secret Manager API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://secretmanager.googleapis.com";

/// Default compute metadata server
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal";

/// Environment variable names
pub const ENV_PROJECT_ID: &str = "ASTRA_PROJECT_ID";
pub const ENV_SECRET_ID: &str = "ASTRA_SECRET_ID";
pub const ENV_ENDPOINT: &str = "SECRET_MANAGER_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "SECRET_MANAGER_TIMEOUT_SECS";
pub const ENV_ACCESS_TOKEN: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
pub const ENV_METADATA_HOST: &str = "GCE_METADATA_HOST";

/// Secret access settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Google Cloud project holding the secret
    pub project_id: Option<String>,
    /// Secret holding the client credentials
    pub secret_id: Option<String>,
    /// Secret Manager API base URL
    pub endpoint: String,
    /// Metadata server base URL, used when no access token is set
    pub metadata_endpoint: String,
    /// Explicit OAuth2 access token
    pub access_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_id: None,
            secret_id: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            metadata_endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("project_id", &self.project_id)
            .field("secret_id", &self.secret_id)
            .field("endpoint", &self.endpoint)
            .field("metadata_endpoint", &self.metadata_endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    /// Load settings from `path` (or the default location when it exists),
    /// then apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(&path)?,
                _ => {
                    debug!("No settings file found, using defaults");
                    Self::default()
                }
            },
        };

        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "astra-creds", "astra-creds")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Apply overrides from `lookup` (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(project_id) = lookup(ENV_PROJECT_ID) {
            self.project_id = Some(project_id);
        }
        if let Some(secret_id) = lookup(ENV_SECRET_ID) {
            self.secret_id = Some(secret_id);
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(host) = lookup(ENV_METADATA_HOST) {
            self.metadata_endpoint = format!("http://{}", host);
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.parse().ok()) {
            self.timeout_secs = timeout;
        }
    }

    /// Check endpoints and timeout
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("endpoint", &self.endpoint),
            ("metadataEndpoint", &self.metadata_endpoint),
        ] {
            url::Url::parse(value)
                .map_err(|e| CredsError::Config(format!("invalid {} {:?}: {}", field, value, e)))?;
        }

        if self.timeout_secs == 0 {
            return Err(CredsError::Config("timeoutSecs must be positive".to_string()));
        }

        Ok(())
    }
}
