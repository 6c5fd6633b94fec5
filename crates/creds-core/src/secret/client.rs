//! Google Cloud Secret Manager REST backend
//!
//! Calls `GET {endpoint}/v1/{name}:access` and decodes the base64 payload.
//! Requests are sent once; retries are left to the caller.

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::{debug, warn};

use super::{AccessTokenSource, SecretAccessor, SecretPayload, SecretVersionName};
use crate::error::{CredsError, Result};
use crate::settings::Settings;

/// Secret Manager REST client
pub struct SecretManagerClient {
    /// HTTP client
    client: Client,
    /// API base URL, without trailing slash
    endpoint: String,
    /// Bearer token source
    token_source: AccessTokenSource,
}

/// `AccessSecretVersion` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessSecretVersionResponse {
    name: Option<String>,
    payload: Option<RawPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(default)]
    data: String,
    #[serde(default, deserialize_with = "deserialize_int64")]
    data_crc32c: Option<i64>,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// int64 fields arrive as JSON strings, but accept plain numbers too
fn deserialize_int64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64Repr {
        Number(i64),
        Text(String),
    }

    match Option::<Int64Repr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Int64Repr::Number(n)) => Ok(Some(n)),
        Some(Int64Repr::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl SecretManagerClient {
    /// Create a client for `endpoint` (e.g. `https://secretmanager.googleapis.com`)
    pub fn new(endpoint: &str, token_source: AccessTokenSource, timeout: Duration) -> Result<Self> {
        url::Url::parse(endpoint)
            .map_err(|e| CredsError::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token_source,
        })
    }

    /// Create a client from settings.
    ///
    /// An explicit access token wins; otherwise tokens come from the metadata server.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let token_source = match settings.access_token.as_deref() {
            Some(token) => AccessTokenSource::fixed(token),
            None => AccessTokenSource::metadata_server(&settings.metadata_endpoint),
        };

        Self::new(
            &settings.endpoint,
            token_source,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// API base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Map a non-success response onto an error
    async fn error_for_status(
        name: &SecretVersionName,
        response: reqwest::Response,
    ) -> CredsError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);

        warn!("Secret Manager returned HTTP {} for {}", status, name);

        match status {
            StatusCode::NOT_FOUND => CredsError::SecretNotFound(name.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CredsError::PermissionDenied {
                name: name.to_string(),
                message,
            },
            _ => CredsError::Provider {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl SecretAccessor for SecretManagerClient {
    async fn access(&self, name: &SecretVersionName) -> Result<SecretPayload> {
        let url = format!("{}/v1/{}:access", self.endpoint, name);
        debug!("Accessing secret version: {}", name);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = self.token_source.token(&self.client).await? {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(name, response).await);
        }

        let body: AccessSecretVersionResponse = response.json().await?;
        let payload = body.payload.ok_or_else(|| {
            CredsError::InvalidPayload(format!("response for {} has no payload", name))
        })?;

        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.data.as_bytes())
            .map_err(|e| CredsError::InvalidPayload(format!("base64 decode error: {}", e)))?;

        let checksum = match payload.data_crc32c {
            Some(value) => Some(u32::try_from(value).map_err(|_| {
                CredsError::InvalidPayload(format!("dataCrc32c out of range: {}", value))
            })?),
            None => None,
        };

        debug!(
            "Accessed {} ({} bytes)",
            body.name.as_deref().unwrap_or("secret version"),
            data.len()
        );
        Ok(SecretPayload::new(data, checksum))
    }

    fn backend_name(&self) -> &'static str {
        "Google Cloud Secret Manager"
    }
}
