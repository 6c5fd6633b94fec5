//! In-memory secret backend

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{SecretAccessor, SecretPayload, SecretVersionName};
use crate::error::{CredsError, Result};

/// Serves payloads registered up front; useful for local runs and tests
#[derive(Default)]
pub struct StaticSecretAccessor {
    secrets: RwLock<HashMap<String, SecretPayload>>,
}

impl StaticSecretAccessor {
    /// Create an empty accessor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `payload` under `name`
    pub fn insert(&self, name: &SecretVersionName, payload: SecretPayload) {
        self.secrets
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), payload);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_secret(self, name: &SecretVersionName, payload: SecretPayload) -> Self {
        self.insert(name, payload);
        self
    }
}

#[async_trait]
impl SecretAccessor for StaticSecretAccessor {
    async fn access(&self, name: &SecretVersionName) -> Result<SecretPayload> {
        let secrets = self
            .secrets
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        secrets
            .get(&name.to_string())
            .cloned()
            .ok_or_else(|| CredsError::SecretNotFound(name.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "Static"
    }
}
