//! Job status and snapshots.
//!
//! The service reports job status as an opaque string. Exactly two values
//! are terminal for this client: `finished` and `cancelled`. Everything else
//! (queued, running, or whatever the service grows next) is non-terminal and
//! simply gets polled again; the client never enumerates or validates the
//! in-flight states.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed view of a job status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Success terminal state.
    Finished,
    /// Abort terminal state. A normal outcome, not an error.
    Cancelled,
    /// Any other status string, looped on without interpretation.
    Other(String),
}

impl JobStatus {
    /// Parse a status string as reported by the service.
    pub fn parse(s: &str) -> Self {
        match s {
            "finished" => JobStatus::Finished,
            "cancelled" => JobStatus::Cancelled,
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// Check if no further polling is meaningful.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Cancelled)
    }

    /// Check if this is the success terminal state.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Finished)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Finished => "finished",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of a job from `GET /jobs/{job_id}`.
///
/// Only `status` is interpreted. The rest of the payload is service-supplied
/// metadata, carried verbatim for operator display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl JobSnapshot {
    pub fn status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }

    /// The full payload as JSON, for operator display.
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
