//! Error types for the RCLC client.
//!
//! Every workflow stage fails with its own variant so callers can tell a bad
//! configuration from a failed upload or a lost status poll. Wherever the
//! failure came from the service, the raw response travels along for
//! diagnostics. None of these are retried at the workflow level; the only
//! in-crate retry is the poller's backoff on transient status queries.

use thiserror::Error;

use crate::http::{HttpError, ResponseDetail};

/// What went wrong in one workflow stage: a local message, plus the raw
/// service response when the failure came from the service.
#[derive(Debug, Clone)]
pub struct FailureDetail {
    pub message: String,
    pub response: Option<ResponseDetail>,
}

impl FailureDetail {
    /// A failure with no service response (local I/O, transport, decoding).
    pub fn local(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    /// Capture an HTTP-layer failure, keeping the service response if any.
    pub fn from_http(err: HttpError) -> Self {
        match err {
            HttpError::Response(detail) => Self {
                message: "service returned an error".to_string(),
                response: Some(detail),
            },
            other => Self {
                message: other.to_string(),
                response: None,
            },
        }
    }

    /// HTTP status of the service response, if there was one.
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

impl std::fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        if let Some(ref response) = self.response {
            write!(f, " ({})", response)?;
        }
        Ok(())
    }
}

/// Unified error enum for the RCLC client.
#[derive(Debug, Error)]
pub enum RclcError {
    /// Bad or conflicting input, caught before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset upload failed; the whole workflow aborts.
    #[error("dataset upload failed: {0}")]
    Upload(FailureDetail),

    /// Job submission was rejected. No job id was obtained, but the service
    /// may still have created state server-side; nothing is cleaned up.
    #[error("job submission failed: {0}")]
    Submission(FailureDetail),

    /// A status query failed while polling, either fatally or after the
    /// transient-error budget ran out.
    #[error("status query failed for job {job_id}: {detail}")]
    PollQuery { job_id: String, detail: FailureDetail },

    /// Result artifact download failed. A partially written output file may
    /// be left behind; it is not rolled back.
    #[error("result retrieval failed: {0}")]
    Retrieval(FailureDetail),

    /// HTTP request failed at the transport layer.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a payload we could not make sense of.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An overall deadline elapsed.
    #[error("timeout: {0}")]
    Timeout(String),
}

impl RclcError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        RclcError::Config(message.into())
    }

    /// HTTP status of the failing service response, if this error carries one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            RclcError::Upload(d)
            | RclcError::Submission(d)
            | RclcError::Retrieval(d)
            | RclcError::PollQuery { detail: d, .. } => d.status(),
            RclcError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias using RclcError.
pub type RclcResult<T> = Result<T, RclcError>;
