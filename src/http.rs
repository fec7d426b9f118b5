//! HTTP client for RCLC API calls.
//!
//! Thin wrapper around `reqwest` that installs the service's `api_key`
//! header on every request, joins relative paths onto the configured base
//! URL, and normalizes non-success responses into [`HttpError`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "api_key";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POOL_SIZE: usize = 8;

/// Detail of a non-success response from the service.
#[derive(Debug, Clone)]
pub struct ResponseDetail {
    pub status: u16,
    pub url: String,
    /// Raw response body, kept for diagnostics.
    pub body: Option<String>,
}

impl std::fmt::Display for ResponseDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} for {}", self.status, self.url)?;
        if let Some(ref body) = self.body {
            let truncated: String = body.chars().take(200).collect();
            write!(f, " | body[0:200]={}", truncated)?;
        }
        Ok(())
    }
}

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request failed: {0} (is_connect={}, is_timeout={})", .0.is_connect(), .0.is_timeout())]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Response(ResponseDetail),

    #[error("invalid api key characters")]
    InvalidApiKey,

    #[error("json parse error: {0}")]
    JsonParse(String),
}

impl HttpError {
    /// Create an HTTP error from a non-success response.
    pub fn from_response(status: u16, url: &str, body: Option<&str>) -> Self {
        // Keep enough of the body to preserve structured error payloads;
        // Display truncates to 200 chars.
        let body = body.map(|s| s.chars().take(4096).collect());
        HttpError::Response(ResponseDetail {
            status,
            url: url.to_string(),
            body,
        })
    }

    /// Get the HTTP status code, if available.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Response(detail) => Some(detail.status),
            HttpError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether retrying the same call can plausibly succeed.
    ///
    /// Transport failures and 5xx responses are transient; 4xx responses and
    /// undecodable payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::Request(_) => true,
            HttpError::Response(detail) => detail.status >= 500,
            _ => false,
        }
    }
}

/// Async HTTP client for the RCLC API.
///
/// Authentication is a static `api_key` header value sent with every request.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for the API (without trailing slash)
    /// * `api_key` - API key sent as the `api_key` header
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        if !api_key.is_empty() {
            headers.insert(
                API_KEY_HEADER,
                HeaderValue::from_str(api_key).map_err(|_| HttpError::InvalidApiKey)?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(DEFAULT_POOL_SIZE)
            .build()
            .map_err(HttpError::Request)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convert a relative path to an absolute URL.
    fn abs_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        let url = self.abs_url(path);
        let resp = self.client.get(&url).send().await?;
        Self::decode_json(&url, resp).await
    }

    /// Make a GET request, succeed on 2xx, and hand back the raw response so
    /// the caller can stream the body.
    pub async fn get_stream(&self, path: &str) -> Result<reqwest::Response, HttpError> {
        let url = self.abs_url(path);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(HttpError::from_response(
            status,
            &url,
            if body.trim().is_empty() { None } else { Some(&body) },
        ))
    }

    /// Make a POST request with a JSON body.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HttpError> {
        let url = self.abs_url(path);
        let resp = self.client.post(&url).json(body).send().await?;
        Self::decode_json(&url, resp).await
    }

    /// Make a POST request with one multipart file part.
    ///
    /// # Arguments
    ///
    /// * `path` - API path
    /// * `params` - Query parameters
    /// * `field` - Multipart field name
    /// * `filename` - File name reported for the part
    /// * `bytes` - File content
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        field: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<T, HttpError> {
        let url = self.abs_url(path);
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part(field.to_string(), part);
        let resp = self
            .client
            .post(&url)
            .query(params)
            .multipart(form)
            .send()
            .await?;
        Self::decode_json(&url, resp).await
    }

    async fn decode_json<T: DeserializeOwned>(
        url: &str,
        resp: reqwest::Response,
    ) -> Result<T, HttpError> {
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        if !(200..300).contains(&status) {
            let text = String::from_utf8_lossy(&body);
            return Err(HttpError::from_response(
                status,
                url,
                if text.trim().is_empty() { None } else { Some(&text) },
            ));
        }
        serde_json::from_slice(&body).map_err(|e| {
            let text: String = String::from_utf8_lossy(&body).chars().take(100).collect();
            HttpError::JsonParse(format!("{}: {}", e, text))
        })
    }
}
