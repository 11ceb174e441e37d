//! Session credentials for Dataverse API access
//!
//! Requests carry whatever session the operator already has; nothing is
//! stored by this tool.

mod azure_cli;

use anyhow::Result;
use async_trait::async_trait;

pub use azure_cli::AzureAuthenticator;

/// Supplies the `Authorization` header value for an environment, if any
#[async_trait]
pub trait SessionCredentials: Send + Sync {
    async fn authorization(&self, origin: &str) -> Result<Option<String>>;
}

/// No credentials; the request goes out with no `Authorization` header
pub struct Anonymous;

#[async_trait]
impl SessionCredentials for Anonymous {
    async fn authorization(&self, _origin: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
