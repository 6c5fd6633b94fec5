//! Secret backends for credential retrieval
//!
//! This module provides two backends:
//! 1. Google Cloud Secret Manager over REST
//! 2. Static in-memory payloads (local runs and tests)

mod auth;
mod client;
mod memory;
mod name;
mod payload;
mod traits;

pub use auth::{AccessTokenSource, MetadataServerToken};
pub use client::SecretManagerClient;
pub use memory::StaticSecretAccessor;
pub use name::{SecretVersionName, LATEST_VERSION};
pub use payload::SecretPayload;
pub use traits::SecretAccessor;
