//! Datasets API client.

use std::path::Path;

use tracing::info;

use crate::errors::{FailureDetail, RclcError};

use super::client::RclcClient;
use super::types::{DatasetUploadResponse, Id};

/// Endpoint for dataset uploads.
const DATASETS_ENDPOINT: &str = "/datasets";

/// Multipart field name carrying the archive bytes.
const ARCHIVE_FIELD: &str = "data";

/// Datasets API client.
pub struct DatasetsClient<'a> {
    client: &'a RclcClient,
}

impl<'a> DatasetsClient<'a> {
    pub(crate) fn new(client: &'a RclcClient) -> Self {
        Self { client }
    }

    /// Upload a local dataset archive and return the id the service assigned.
    ///
    /// The archive is sent as one multipart part named `data`, with `name`
    /// passed as a query parameter. A failed upload is terminal for the
    /// workflow: there is no retry, and any state the service created stays
    /// server-side.
    pub async fn upload(&self, path: &Path, name: &str) -> Result<Id, RclcError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            RclcError::Upload(FailureDetail::local(format!(
                "failed to open {}: {}",
                path.display(),
                e
            )))
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.zip".to_string());

        info!(path = %path.display(), name = %name, bytes = bytes.len(), "uploading dataset archive");

        let response: DatasetUploadResponse = self
            .client
            .http
            .post_multipart(DATASETS_ENDPOINT, &[("name", name)], ARCHIVE_FIELD, &filename, bytes)
            .await
            .map_err(|err| RclcError::Upload(FailureDetail::from_http(err)))?;

        Ok(response.dataset_id)
    }
}
