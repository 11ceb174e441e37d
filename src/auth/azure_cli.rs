//! Azure CLI credential provider for Dataverse authentication

use super::SessionCredentials;
use anyhow::{Context, Result};
use async_trait::async_trait;
use azure_core::credentials::TokenCredential;
use azure_identity::AzureCliCredential;
use std::sync::Arc;

/// Session credentials taken from the ambient `az login` session
pub struct AzureAuthenticator {
    credential: Arc<AzureCliCredential>,
}

impl AzureAuthenticator {
    /// Create an authenticator backed by the Azure CLI
    pub fn new() -> Result<Self> {
        let credential = AzureCliCredential::new()
            .context("Failed to create Azure CLI credential")?;

        Ok(Self { credential })
    }
}

#[async_trait]
impl SessionCredentials for AzureAuthenticator {
    async fn authorization(&self, origin: &str) -> Result<Option<String>> {
        let scope = format!("{}/.default", origin.trim_end_matches('/'));

        let token = self
            .credential
            .get_token(&[&scope])
            .await
            .context("Failed to get token from Azure CLI. Make sure you're logged in with 'az login'")?;

        Ok(Some(format!("Bearer {}", token.token.secret())))
    }
}
