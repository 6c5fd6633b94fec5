//! Fully-qualified secret version names

use std::fmt;
use std::str::FromStr;

use crate::error::CredsError;

/// Version alias that always resolves to the newest enabled version
pub const LATEST_VERSION: &str = "latest";

/// `projects/{project}/secrets/{secret}/versions/{version}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretVersionName {
    pub project: String,
    pub secret: String,
    pub version: String,
}

impl SecretVersionName {
    /// Create a name for an explicit version
    pub fn new(project: &str, secret: &str, version: &str) -> Self {
        Self {
            project: project.to_string(),
            secret: secret.to_string(),
            version: version.to_string(),
        }
    }

    /// Create a name pointing at the latest version of a secret
    pub fn latest(project: &str, secret: &str) -> Self {
        Self::new(project, secret, LATEST_VERSION)
    }
}

impl fmt::Display for SecretVersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/secrets/{}/versions/{}",
            self.project, self.secret, self.version
        )
    }
}

impl FromStr for SecretVersionName {
    type Err = CredsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();

        match parts.as_slice() {
            ["projects", project, "secrets", secret, "versions", version]
                if !project.is_empty() && !secret.is_empty() && !version.is_empty() =>
            {
                Ok(Self::new(project, secret, version))
            }
            _ => Err(CredsError::InvalidSecretName(s.to_string())),
        }
    }
}
