//! Jobs API client.
//!
//! Submission plus the poll-until-terminal loop. Submission creates exactly
//! one remote job per call and is not idempotent: resubmitting after a
//! failure leaves the first job behind.

use tracing::{info, warn};

use crate::errors::{FailureDetail, RclcError};
use crate::http::HttpError;
use crate::jobs::{JobSnapshot, JobStatus};
use crate::polling::{PollConfig, PollState};

use super::client::RclcClient;
use super::types::{Id, JobRequest, JobSubmitResponse};

/// Create endpoint for training jobs.
const MODELS_ENDPOINT: &str = "/models";
/// Create endpoint for inference jobs.
const INFERENCES_ENDPOINT: &str = "/inferences";
/// Status endpoint root.
const JOBS_ENDPOINT: &str = "/jobs";

/// Terminal observation returned by the poller.
#[derive(Debug, Clone)]
pub struct PolledJob {
    /// Final snapshot from the service.
    pub snapshot: JobSnapshot,
    /// True when the job ended `cancelled`.
    pub aborted: bool,
}

/// Jobs API client.
pub struct JobsClient<'a> {
    client: &'a RclcClient,
}

impl<'a> JobsClient<'a> {
    pub(crate) fn new(client: &'a RclcClient) -> Self {
        Self { client }
    }

    /// Submit a job and return the id the service assigned.
    pub async fn submit(&self, request: &JobRequest) -> Result<Id, RclcError> {
        let response: Result<JobSubmitResponse, HttpError> = match request {
            JobRequest::Training(body) => self.client.http.post_json(MODELS_ENDPOINT, body).await,
            JobRequest::Inference(body) => {
                self.client.http.post_json(INFERENCES_ENDPOINT, body).await
            }
        };
        response
            .map(|r| r.job_id)
            .map_err(|err| RclcError::Submission(FailureDetail::from_http(err)))
    }

    /// Get one status snapshot for a job.
    pub async fn get_status(&self, job_id: &Id) -> Result<JobSnapshot, RclcError> {
        self.status_raw(job_id).await.map_err(|err| RclcError::PollQuery {
            job_id: job_id.to_string(),
            detail: FailureDetail::from_http(err),
        })
    }

    async fn status_raw(&self, job_id: &Id) -> Result<JobSnapshot, HttpError> {
        let path = format!("{}/{}", JOBS_ENDPOINT, job_id);
        self.client.http.get(&path).await
    }

    /// Poll a job until it reaches a terminal state.
    ///
    /// `finished` and `cancelled` are the only terminal statuses. Any other
    /// status is surfaced with its full payload and polled again after the
    /// configured interval. Transient query failures (transport errors, 5xx)
    /// back off exponentially and only abort once `max_consecutive_errors`
    /// hit in a row; 4xx responses and undecodable payloads abort
    /// immediately. With no deadline configured the loop runs until the
    /// service produces a terminal status.
    pub async fn poll_until_terminal(
        &self,
        job_id: &Id,
        config: &PollConfig,
    ) -> Result<PolledJob, RclcError> {
        let mut state = PollState::new(config.clone());

        loop {
            if state.is_timed_out() {
                return Err(RclcError::Timeout(format!(
                    "job {} did not reach a terminal state in time",
                    job_id
                )));
            }

            match self.status_raw(job_id).await {
                Ok(snapshot) => {
                    state.record_success();

                    if snapshot.status.is_empty() {
                        return Err(RclcError::PollQuery {
                            job_id: job_id.to_string(),
                            detail: FailureDetail::local("status payload had no status field"),
                        });
                    }

                    match snapshot.status() {
                        JobStatus::Finished => {
                            info!(job_id = %job_id, "job finished");
                            return Ok(PolledJob {
                                snapshot,
                                aborted: false,
                            });
                        }
                        JobStatus::Cancelled => {
                            warn!(job_id = %job_id, "job was cancelled by the service");
                            return Ok(PolledJob {
                                snapshot,
                                aborted: true,
                            });
                        }
                        JobStatus::Other(status) => {
                            info!(
                                job_id = %job_id,
                                status = %status,
                                payload = %snapshot.to_payload(),
                                "job still in progress"
                            );
                        }
                    }
                }
                Err(err) if err.is_retryable() => {
                    state.record_error();
                    if state.should_give_up() {
                        return Err(RclcError::PollQuery {
                            job_id: job_id.to_string(),
                            detail: FailureDetail::from_http(err),
                        });
                    }
                    warn!(
                        job_id = %job_id,
                        consecutive = state.consecutive_errors(),
                        error = %err,
                        "status query failed; backing off"
                    );
                }
                Err(err) => {
                    return Err(RclcError::PollQuery {
                        job_id: job_id.to_string(),
                        detail: FailureDetail::from_http(err),
                    });
                }
            }

            tokio::time::sleep(state.next_delay()).await;
        }
    }
}
