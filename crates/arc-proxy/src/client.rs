//! Community data API client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::error::ProxyError;

/// Envelope keys tried after the resource's own key
const GENERIC_ENVELOPE_KEYS: &[&str] = &["data", "results"];

/// Upstream collection exposed by a community API
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Items,
    Quests,
    Maps,
    Events,
    Traders,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Items,
        Resource::Quests,
        Resource::Maps,
        Resource::Events,
        Resource::Traders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Items => "items",
            Resource::Quests => "quests",
            Resource::Maps => "maps",
            Resource::Events => "events",
            Resource::Traders => "traders",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source client configuration
#[derive(Clone, Debug)]
pub struct SourceClientConfig {
    /// Source name used in logs
    pub name: String,
    /// Base URL of the API; resources are fetched from `{url}/{resource}`
    pub url: String,
    /// Upper bound for a whole request, connect to last body byte
    pub timeout: Duration,
    /// Optional `limit` query parameter sent with every request
    pub page_limit: Option<u32>,
}

/// HTTP client for one upstream data source
pub struct SourceClient {
    config: SourceClientConfig,
    client: RwLock<Option<Client>>,
}

impl SourceClient {
    /// Create a new source client
    pub fn new(config: SourceClientConfig) -> Result<Self, ProxyError> {
        let parsed = Url::parse(&config.url)
            .map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", config.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProxyError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                config.url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("arc-companion/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            "Created source client {} for {} (timeout: {:?})",
            config.name, config.url, config.timeout
        );

        Ok(Self {
            config,
            client: RwLock::new(Some(client)),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SourceClientConfig {
        &self.config
    }

    fn resource_url(&self, resource: Resource) -> String {
        format!(
            "{}/{}",
            self.config.url.trim_end_matches('/'),
            resource.as_str()
        )
    }

    /// Fetch the raw records of one resource.
    ///
    /// Any transport failure, timeout, non-success status or unparseable body
    /// is returned as an error; this method never retries.
    pub async fn fetch_records(&self, resource: Resource) -> Result<Vec<Value>, ProxyError> {
        let client = self.client.read().await.clone().ok_or(ProxyError::Closed)?;

        let url = self.resource_url(resource);
        debug!("Fetching {} from {}", resource, url);

        let mut request = client.get(&url);
        if let Some(limit) = self.config.page_limit {
            request = request.query(&[("limit", limit)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(ProxyError::UpstreamError {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ProxyError::InvalidResponse(format!("{}: {}", url, e)))?;

        let records = unwrap_records(value, resource)?;
        debug!(
            "Fetched {} {} records from {}",
            records.len(),
            resource,
            self.config.name
        );
        Ok(records)
    }

    /// Drop the underlying HTTP client. Safe to call more than once.
    pub async fn close(&self) {
        let mut client = self.client.write().await;
        if client.take().is_some() {
            info!("Closed source client {}", self.config.name);
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.client.read().await.is_none()
    }
}

/// Extract the record array from a response body.
///
/// Accepts a bare array, or an object wrapping the array under the resource
/// name (`{"items": [...]}`) or a generic `data`/`results` key.
pub fn unwrap_records(value: Value, resource: Resource) -> Result<Vec<Value>, ProxyError> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => {
            let keys = std::iter::once(resource.as_str()).chain(GENERIC_ENVELOPE_KEYS.iter().copied());
            for key in keys {
                if let Some(Value::Array(records)) = map.remove(key) {
                    return Ok(records);
                }
            }
            Err(ProxyError::InvalidResponse(format!(
                "object response has no {} array",
                resource
            )))
        }
        other => Err(ProxyError::InvalidResponse(format!(
            "expected array or object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
