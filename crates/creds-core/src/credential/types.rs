//! Credential type definitions

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CredsError, Result};

/// JSON key holding the client id
pub const CLIENT_ID_KEY: &str = "client_id";

/// JSON key holding the client secret
pub const CLIENT_SECRET_KEY: &str = "secret";

/// Secret value - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Consume and return the inner value
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Flat JSON object stored in the secret
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct CredentialJson {
    client_id: String,
    secret: String,
}

/// Parsed client id / secret pair
#[derive(Clone, PartialEq)]
pub struct ClientCredentials {
    /// Client id, exposed as the username
    pub client_id: String,
    /// Client secret, exposed as the token
    pub secret: SecretString,
}

impl ClientCredentials {
    /// Create credentials from their parts
    pub fn new(client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            secret: SecretString::new(secret.into()),
        }
    }

    /// Parse a `{"client_id": ..., "secret": ...}` payload.
    ///
    /// Bytes must be UTF-8 JSON; extra keys are ignored.
    pub fn from_json_bytes(data: &[u8]) -> Result<Self> {
        let mut parsed: CredentialJson =
            serde_json::from_slice(data).map_err(CredsError::CredentialParse)?;

        Ok(Self {
            client_id: std::mem::take(&mut parsed.client_id),
            secret: SecretString::new(std::mem::take(&mut parsed.secret)),
        })
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
