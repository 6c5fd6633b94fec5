//! # creds-core
//!
//! Core functionality for astra-creds:
//! - Google Cloud Secret Manager access over REST
//! - CRC32C payload integrity verification
//! - Client credential parsing with zeroize-on-drop secrets
//! - A process-wide credential store with an injectable secret backend

pub mod checksum;
pub mod credential;
pub mod error;
pub mod secret;
pub mod settings;

pub use checksum::{crc32c, verify_crc32c};
pub use credential::{ClientCredentials, CredentialStore, PopulateOutcome, SecretString};
pub use error::{CredsError, Result};
pub use secret::{
    AccessTokenSource, SecretAccessor, SecretManagerClient, SecretPayload, SecretVersionName,
    StaticSecretAccessor,
};
pub use settings::Settings;
