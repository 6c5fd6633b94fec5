//! Process-wide client credential store

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::types::{ClientCredentials, SecretString};
use crate::checksum::verify_crc32c;
use crate::error::{CredsError, Result};
use crate::secret::{SecretAccessor, SecretManagerClient, SecretPayload, SecretVersionName};
use crate::settings::Settings;

/// Lazily created process-wide store
static GLOBAL: OnceCell<CredentialStore> = OnceCell::new();

/// Result of a populate call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// Credentials were fetched, verified and stored
    Populated,
    /// Project or secret id was missing; nothing was fetched
    NotConfigured,
}

/// Stands in for a backend that could not be built; every access reports why
struct UnavailableAccessor {
    reason: String,
}

#[async_trait]
impl SecretAccessor for UnavailableAccessor {
    async fn access(&self, _name: &SecretVersionName) -> Result<SecretPayload> {
        Err(CredsError::Config(self.reason.clone()))
    }

    fn backend_name(&self) -> &'static str {
        "Unavailable"
    }
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|s| !s.trim().is_empty())
}

/// Holds the client id / secret pair fetched from a secret backend.
///
/// Both values are replaced together, so readers see either nothing or a
/// complete pair. Failed populate calls leave the previous pair in place.
pub struct CredentialStore {
    /// Secret backend
    accessor: Arc<dyn SecretAccessor>,
    /// Current credentials (None until a populate succeeds)
    credentials: RwLock<Option<ClientCredentials>>,
}

impl CredentialStore {
    /// Create an unpopulated store around a secret backend
    pub fn new(accessor: Arc<dyn SecretAccessor>) -> Self {
        debug!("Credential store created ({} backend)", accessor.backend_name());

        Self {
            accessor,
            credentials: RwLock::new(None),
        }
    }

    /// Get the process-wide store, creating it from the environment on first use
    pub fn global() -> &'static CredentialStore {
        GLOBAL.get_or_init(Self::from_env)
    }

    /// Install `store` as the process-wide store.
    ///
    /// Must happen before the first [`global`](Self::global) call.
    pub fn install_global(store: CredentialStore) -> Result<&'static CredentialStore> {
        GLOBAL
            .try_insert(store)
            .map_err(|_| CredsError::GlobalAlreadyInitialized)
    }

    fn from_env() -> Self {
        let settings = Settings::from_env();

        match SecretManagerClient::from_settings(&settings) {
            Ok(client) => Self::new(Arc::new(client)),
            Err(e) => {
                error!("Failed to create Secret Manager client: {}", e);
                Self::new(Arc::new(UnavailableAccessor {
                    reason: format!("Secret Manager client unavailable: {}", e),
                }))
            }
        }
    }

    /// Fetch, verify and store the credentials held in the latest version of
    /// `projects/{project_id}/secrets/{secret_id}`.
    ///
    /// Missing ids are logged and reported as [`PopulateOutcome::NotConfigured`].
    pub async fn populate(
        &self,
        project_id: Option<&str>,
        secret_id: Option<&str>,
    ) -> Result<PopulateOutcome> {
        let (project_id, secret_id) = match (non_empty(project_id), non_empty(secret_id)) {
            (Some(project_id), Some(secret_id)) => (project_id, secret_id),
            _ => {
                error!("Required secret manager properties are missing, please check.");
                return Ok(PopulateOutcome::NotConfigured);
            }
        };

        let name = SecretVersionName::latest(project_id, secret_id);
        let payload = self.accessor.access(&name).await?;

        verify_crc32c(payload.data(), payload.data_crc32c())?;
        let credentials = ClientCredentials::from_json_bytes(payload.data())?;

        *self.credentials.write().await = Some(credentials);

        info!("Populated client credentials from {}", name);
        Ok(PopulateOutcome::Populated)
    }

    /// Populate using the project and secret ids from settings
    pub async fn populate_from_settings(&self, settings: &Settings) -> Result<PopulateOutcome> {
        self.populate(settings.project_id.as_deref(), settings.secret_id.as_deref())
            .await
    }

    /// Client id of the stored credentials
    pub async fn username(&self) -> Option<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.client_id.clone())
    }

    /// Client secret of the stored credentials
    pub async fn token(&self) -> Option<SecretString> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.secret.clone())
    }

    /// Snapshot of both values
    pub async fn credentials(&self) -> Option<ClientCredentials> {
        self.credentials.read().await.clone()
    }

    /// Whether a populate call has succeeded
    pub async fn is_populated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Name of the secret backend in use
    pub fn backend_name(&self) -> &'static str {
        self.accessor.backend_name()
    }
}
