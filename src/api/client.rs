//! Dataverse Web API client

use crate::auth::SessionCredentials;
use crate::models::FetchQuery;
use crate::origin::Origin;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Default Web API version segment
pub const DEFAULT_API_VERSION: &str = "v9.1";

/// Entity sets queried by the lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitySet {
    Roles,
    SystemUsers,
}

impl EntitySet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roles => "roles",
            Self::SystemUsers => "systemusers",
        }
    }
}

/// Executes FetchXML queries against an environment.
///
/// Implementations never fail: any problem is logged and reported as `None`,
/// which callers treat the same as an empty result.
#[async_trait]
pub trait FetchXmlSource: Send + Sync {
    async fn fetch(&self, origin: &Origin, entity_set: EntitySet, query: &FetchQuery)
        -> Option<JsonValue>;
}

/// HTTP client for Dataverse Web API
pub struct DataverseClient {
    http_client: Client,
    credentials: Arc<dyn SessionCredentials>,
    api_version: String,
}

impl DataverseClient {
    /// Create a new Dataverse client
    pub fn new(credentials: Arc<dyn SessionCredentials>, api_version: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("rolelens/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            credentials,
            api_version: api_version.into(),
        })
    }

    /// Build the full request URL for a query
    pub fn query_url(&self, origin: &Origin, entity_set: EntitySet, query: &FetchQuery) -> String {
        format!(
            "{}?fetchXml={}",
            origin.api_url(&self.api_version, entity_set.as_str()),
            urlencoding::encode(&query.to_xml())
        )
    }

    /// Make a GET request and parse the JSON body
    async fn get_json(&self, origin: &Origin, url: &str) -> Result<JsonValue> {
        let mut request = self
            .http_client
            .get(url)
            .header("OData-Version", "4.0")
            .header("OData-MaxVersion", "4.0")
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");

        if let Some(authorization) = self.credentials.authorization(&origin.to_string()).await? {
            request = request.header("Authorization", authorization);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to Dataverse")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to fetch data: {} {}", status, body);
        }

        response
            .json::<JsonValue>()
            .await
            .context("Failed to parse JSON response")
    }
}

#[async_trait]
impl FetchXmlSource for DataverseClient {
    async fn fetch(
        &self,
        origin: &Origin,
        entity_set: EntitySet,
        query: &FetchQuery,
    ) -> Option<JsonValue> {
        let url = self.query_url(origin, entity_set, query);
        tracing::debug!("GET {}", url);

        match self.get_json(origin, &url).await {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!("Error fetching data from {}: {:#}", entity_set.as_str(), e);
                None
            }
        }
    }
}
