//! Error types for creds-core

use thiserror::Error;

/// Result type alias for credential operations
pub type Result<T> = std::result::Result<T, CredsError>;

/// Credential error types
#[derive(Error, Debug)]
pub enum CredsError {
    #[error("The checksum received is invalid for secret payload (expected {expected}, computed {actual:#010x}). Corrupted Data Detected!")]
    ChecksumMismatch {
        /// Checksum reported by the provider, if any
        expected: ChecksumDisplay,
        /// Checksum computed locally over the payload bytes
        actual: u32,
    },

    #[error("Error occurred while extracting client id/secret from JSON: {0}")]
    CredentialParse(#[source] serde_json::Error),

    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Permission denied accessing {name}: {message}")]
    PermissionDenied { name: String, message: String },

    #[error("Secret provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid secret payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid secret version name: {0}")]
    InvalidSecretName(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Global credential store is already initialized")]
    GlobalAlreadyInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Provider checksum as shown in [`CredsError::ChecksumMismatch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumDisplay(pub Option<u32>);

impl std::fmt::Display for ChecksumDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:#010x}", value),
            None => f.write_str("none"),
        }
    }
}
