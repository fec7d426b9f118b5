//! Results API client.

use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::errors::{FailureDetail, RclcError};

use super::client::RclcClient;
use super::types::Id;

/// Endpoint root for result artifacts.
const RESULTS_ENDPOINT: &str = "/results";

/// Results API client.
pub struct ResultsClient<'a> {
    client: &'a RclcClient,
}

impl<'a> ResultsClient<'a> {
    pub(crate) fn new(client: &'a RclcClient) -> Self {
        Self { client }
    }

    /// Download the result archive for a finished job to `path`.
    ///
    /// Any existing file at `path` is truncated. The body is streamed to
    /// disk chunk by chunk, so a failure mid-transfer leaves a partial file
    /// behind; the write is not atomic. Returns the number of bytes written.
    pub async fn download_to(&self, job_id: &Id, path: &Path) -> Result<u64, RclcError> {
        let endpoint = format!("{}/{}", RESULTS_ENDPOINT, job_id);
        let mut response = self
            .client
            .http
            .get_stream(&endpoint)
            .await
            .map_err(|err| RclcError::Retrieval(FailureDetail::from_http(err)))?;

        let mut file = File::create(path).await.map_err(|e| {
            RclcError::Retrieval(FailureDetail::local(format!(
                "failed to create {}: {}",
                path.display(),
                e
            )))
        })?;

        let mut written: u64 = 0;
        loop {
            let chunk = response.chunk().await.map_err(|e| {
                RclcError::Retrieval(FailureDetail::local(format!(
                    "result stream interrupted after {} bytes: {}",
                    written, e
                )))
            })?;
            let Some(chunk) = chunk else { break };
            file.write_all(&chunk).await.map_err(|e| {
                RclcError::Retrieval(FailureDetail::local(format!(
                    "failed to write {}: {}",
                    path.display(),
                    e
                )))
            })?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| {
            RclcError::Retrieval(FailureDetail::local(format!(
                "failed to flush {}: {}",
                path.display(),
                e
            )))
        })?;

        info!(job_id = %job_id, path = %path.display(), bytes = written, "results downloaded");
        Ok(written)
    }
}
