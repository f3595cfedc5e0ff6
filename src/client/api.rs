//! HTTP client for the findings backend.
//!
//! Every request runs under a fixed client-side deadline. Failures are
//! normalized into [`ClientError`] so callers can tell a timeout from a
//! bad status, a transport failure, or an unparseable body.

use crate::errors::ClientError;
use crate::models::{Finding, HealthStatus, Summary};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Client-side deadline for a single request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(12_000);

/// Page size requested from the findings endpoint by default.
pub const DEFAULT_FINDINGS_LIMIT: u32 = 200;

pub const SUMMARY_PATH: &str = "/api/v1/summary";
pub const FINDINGS_PATH: &str = "/api/v1/findings";
pub const HEALTH_PATH: &str = "/health";

/// Connection settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base address prepended verbatim to every request path.
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Read-only client for the findings API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client with a default HTTP stack (no cookie store).
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(ClientError::Client)?;

        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a client on top of an existing `reqwest::Client`.
    pub fn with_http_client(config: ClientConfig, http_client: reqwest::Client) -> Self {
        debug!(
            "API client targeting {} (timeout {}ms)",
            config.base_url,
            config.timeout.as_millis()
        );
        Self {
            config,
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// GET `base_url + path` and decode the JSON body as `T`.
    ///
    /// The deadline covers sending the request and reading the body. When it
    /// fires, the in-flight request is dropped and `RequestTimeout` returned.
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("GET {}", url);

        match tokio::time::timeout(self.config.timeout, self.get_json(&url, path)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Request to {} exceeded {}ms deadline",
                    path,
                    self.config.timeout.as_millis()
                );
                Err(ClientError::RequestTimeout {
                    path: path.to_string(),
                    seconds: self.config.timeout.as_secs_f64(),
                })
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, path: &str) -> Result<T, ClientError> {
        let network_error = |source: reqwest::Error| ClientError::Network {
            path: path.to_string(),
            source,
        };

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::RequestFailed {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(network_error)?;
        debug!("{} -> {} ({} bytes)", path, status, body.len());

        serde_json::from_slice(&body).map_err(|source| ClientError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Fetch severity-tier counts.
    pub async fn get_summary(&self) -> Result<Summary, ClientError> {
        self.fetch_json(SUMMARY_PATH).await
    }

    /// Fetch up to `limit` findings. The limit is passed through as given.
    pub async fn get_findings(&self, limit: u32) -> Result<Vec<Finding>, ClientError> {
        self.fetch_json(&format!("{}?limit={}", FINDINGS_PATH, limit))
            .await
    }

    /// Probe backend liveness.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.fetch_json(HEALTH_PATH).await
    }

    /// Fetch the summary and a page of findings concurrently.
    ///
    /// Each request keeps its own deadline; the first failure is returned.
    pub async fn fetch_dashboard(&self, limit: u32) -> Result<(Summary, Vec<Finding>), ClientError> {
        futures::future::try_join(self.get_summary(), self.get_findings(limit)).await
    }
}
