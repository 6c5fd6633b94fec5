//! Bearer token sources for Secret Manager requests
//!
//! Tokens come from ambient configuration:
//! - an explicit token (e.g. `GOOGLE_OAUTH_ACCESS_TOKEN`)
//! - the GCE/GKE metadata server
//! - nothing at all, for emulators and local fakes

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::credential::SecretString;
use crate::error::{CredsError, Result};

/// Path of the default service account token on the metadata server
const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh cached tokens this long before they actually expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Where the bearer token for Secret Manager requests comes from
pub enum AccessTokenSource {
    /// Send requests without an `Authorization` header
    None,
    /// A fixed token supplied by the caller
    Static(SecretString),
    /// Fetch and cache tokens from the metadata server
    MetadataServer(MetadataServerToken),
}

impl AccessTokenSource {
    /// Use a fixed token
    pub fn fixed(token: impl Into<String>) -> Self {
        Self::Static(SecretString::new(token.into()))
    }

    /// Use the metadata server at `endpoint` (e.g. `http://metadata.google.internal`)
    pub fn metadata_server(endpoint: &str) -> Self {
        Self::MetadataServer(MetadataServerToken::new(endpoint))
    }

    /// Resolve the current bearer token, if this source provides one
    pub async fn token(&self, client: &Client) -> Result<Option<SecretString>> {
        match self {
            Self::None => Ok(None),
            Self::Static(token) => Ok(Some(token.clone())),
            Self::MetadataServer(source) => source.token(client).await.map(Some),
        }
    }

    /// Short description for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Static(_) => "static",
            Self::MetadataServer(_) => "metadata-server",
        }
    }
}

impl std::fmt::Debug for AccessTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessTokenSource").field(&self.kind()).finish()
    }
}

/// Metadata server token response
#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

/// Token source backed by the compute metadata server
pub struct MetadataServerToken {
    endpoint: String,
    cache: RwLock<Option<CachedToken>>,
}

impl MetadataServerToken {
    /// Create a token source for the given metadata server base URL
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            cache: RwLock::new(None),
        }
    }

    /// Get a valid token, fetching a fresh one when the cache is empty or stale
    pub async fn token(&self, client: &Client) -> Result<SecretString> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Utc::now() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let url = format!("{}{}", self.endpoint, METADATA_TOKEN_PATH);
        debug!("Fetching access token from metadata server: {}", url);

        let response = client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| CredsError::Auth(format!("metadata server unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(CredsError::Auth(format!(
                "metadata server returned HTTP {}",
                response.status()
            )));
        }

        let body: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| CredsError::Auth(format!("invalid token response: {}", e)))?;

        let lifetime = body.expires_in.saturating_sub(EXPIRY_MARGIN_SECS).max(0);
        let expires_at = Duration::try_seconds(lifetime)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                CredsError::Auth(format!("token expires_in out of range: {}", body.expires_in))
            })?;
        let token = SecretString::new(body.access_token);

        *self.cache.write().await = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });

        debug!("Cached metadata server token for {}s", lifetime);
        Ok(token)
    }
}
