//! Secret accessor trait definitions

use async_trait::async_trait;

use super::{SecretPayload, SecretVersionName};
use crate::error::Result;

/// Trait for secret access backends
#[async_trait]
pub trait SecretAccessor: Send + Sync {
    /// Fetch the payload of a secret version
    async fn access(&self, name: &SecretVersionName) -> Result<SecretPayload>;

    /// Get a human-readable name for this backend
    fn backend_name(&self) -> &'static str;
}
