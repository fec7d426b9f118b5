//! Main RCLC API client.
//!
//! [`RclcClient`] holds the authenticated HTTP client and hands out borrowed
//! sub-clients for the individual endpoint families.

use crate::config::{api_key_from_env, RunConfig, DEFAULT_BASE_URL, ENV_API_KEY};
use crate::errors::RclcError;
use crate::http::{HttpClient, DEFAULT_TIMEOUT_SECS};

use super::datasets::DatasetsClient;
use super::jobs::JobsClient;
use super::results::ResultsClient;

/// RCLC API client.
///
/// # Example
///
/// ```ignore
/// let client = RclcClient::new("my-api-key", None)?;
/// let datasets = client.datasets();
/// let jobs = client.jobs();
/// ```
pub struct RclcClient {
    pub(crate) http: HttpClient,
    base_url: String,
}

impl RclcClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key sent as the `api_key` header
    /// * `base_url` - Optional base URL (defaults to the public service)
    pub fn new(api_key: &str, base_url: Option<&str>) -> Result<Self, RclcError> {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(
        api_key: &str,
        base_url: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, RclcError> {
        let base_url = base_url.unwrap_or(DEFAULT_BASE_URL).to_string();
        let http = HttpClient::new(&base_url, api_key, timeout_secs)
            .map_err(|e| RclcError::config(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { http, base_url })
    }

    /// Create a client from the environment (`RCLC_API_KEY`).
    pub fn from_env() -> Result<Self, RclcError> {
        let api_key = api_key_from_env().ok_or_else(|| {
            RclcError::config(format!("{} environment variable not set", ENV_API_KEY))
        })?;
        Self::new(&api_key, None)
    }

    /// Build a client for one configured run.
    pub fn from_config(config: &RunConfig) -> Result<Self, RclcError> {
        Self::new(config.api_key()?, Some(&config.api_base_url))
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Datasets API client (upload).
    pub fn datasets(&self) -> DatasetsClient<'_> {
        DatasetsClient::new(self)
    }

    /// Jobs API client (submit, status, poll).
    pub fn jobs(&self) -> JobsClient<'_> {
        JobsClient::new(self)
    }

    /// Results API client (artifact download).
    pub fn results(&self) -> ResultsClient<'_> {
        ResultsClient::new(self)
    }
}

impl std::fmt::Debug for RclcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RclcClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
