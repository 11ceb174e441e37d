//! Environment origin discovery and validation

use crate::error::{LookupError, LookupResult};
use async_trait::async_trait;
use std::fmt;
use url::Url;

/// Default suffix every Dataverse host must carry
pub const DEFAULT_TRUSTED_SUFFIX: &str = ".dynamics.com";

/// Supplies the URL of the environment the user is currently working in.
#[async_trait]
pub trait OriginProvider: Send + Sync {
    /// Return the raw URL of the active environment
    async fn current_url(&self) -> LookupResult<String>;
}

/// Origin provider backed by the environment URL given on the command line
pub struct EnvironmentOrigin {
    url: String,
}

impl EnvironmentOrigin {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl OriginProvider for EnvironmentOrigin {
    async fn current_url(&self) -> LookupResult<String> {
        Ok(self.url.clone())
    }
}

/// A validated base URL (scheme + host) for a Dataverse environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Build the Web API URL for an entity set
    ///
    /// # Arguments
    /// * `api_version` - Web API version segment (e.g., "v9.1")
    /// * `entity_set` - Entity set name (e.g., "roles")
    pub fn api_url(&self, api_version: &str, entity_set: &str) -> String {
        format!("{}/api/data/{}/{}", self, api_version, entity_set)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}

/// Validate a URL against the trusted host suffix and derive its origin.
///
/// Path, query and fragment are dropped. The suffix comparison is
/// case-insensitive.
pub fn resolve_origin(raw: &str, trusted_suffix: &str) -> LookupResult<Origin> {
    let parsed = Url::parse(raw.trim()).map_err(|e| LookupError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LookupError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| LookupError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        })?
        .to_ascii_lowercase();

    if !host.ends_with(&trusted_suffix.to_ascii_lowercase()) {
        return Err(LookupError::WrongOrigin { host });
    }

    Ok(Origin {
        scheme: parsed.scheme().to_string(),
        host,
        port: parsed.port(),
    })
}
