//! Workflow orchestration.
//!
//! One algorithm covers all four strategies: upload the dataset when the run
//! has one, build and submit the job request, poll to a terminal state, and
//! download the results archive when the submitted request calls for one.
//! Each run is strictly sequential, and nothing created server-side
//! (uploaded dataset, submitted job) is cleaned up when a later step fails.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::api::client::RclcClient;
use crate::api::types::{Id, JobRequest};
use crate::config::{RunConfig, Strategy};
use crate::errors::RclcError;
use crate::polling::PollConfig;

/// How a workflow run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The job finished. `results` names the downloaded artifact when the
    /// submitted request called for one.
    Finished {
        job_id: Id,
        results: Option<PathBuf>,
    },
    /// The service cancelled the job. A clean end with no artifact.
    Cancelled { job_id: Id },
}

/// Run one configured workflow to completion.
pub async fn run_workflow(config: &RunConfig) -> Result<RunOutcome, RclcError> {
    let client = RclcClient::from_config(config)?;
    run_workflow_with(&client, config).await
}

/// Like [`run_workflow`], with a caller-supplied client.
pub async fn run_workflow_with(
    client: &RclcClient,
    config: &RunConfig,
) -> Result<RunOutcome, RclcError> {
    config.validate()?;

    let dataset_id = resolve_dataset(client, config).await?;
    let request = JobRequest::build(config, dataset_id)?;

    let job_id = client.jobs().submit(&request).await?;
    info!(
        strategy = config.strategy.as_str(),
        job_id = %job_id,
        "job submitted; waiting for it to finish"
    );

    let poll = PollConfig {
        interval: Duration::from_secs_f64(config.poll_interval_secs),
        deadline: match config.poll_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
        ..PollConfig::default()
    };
    let polled = client.jobs().poll_until_terminal(&job_id, &poll).await?;

    if polled.aborted {
        warn!(job_id = %job_id, "run ended without results: the job was cancelled");
        return Ok(RunOutcome::Cancelled { job_id });
    }

    // Retrieval is gated on the request as submitted, not on anything the
    // service reported back about the job.
    let results = if request.wants_results() {
        info!(job_id = %job_id, "retrieving results archive");
        client
            .results()
            .download_to(&job_id, &config.results_path)
            .await?;
        Some(config.results_path.clone())
    } else {
        None
    };

    Ok(RunOutcome::Finished { job_id, results })
}

/// Upload the configured archive, or fall back to a preexisting dataset id.
///
/// `add` runs draw their training data from the models being combined and
/// never touch a dataset.
async fn resolve_dataset(
    client: &RclcClient,
    config: &RunConfig,
) -> Result<Option<Id>, RclcError> {
    if config.strategy == Strategy::Add {
        return Ok(None);
    }
    if let Some(path) = &config.dataset_path {
        let id = client.datasets().upload(path, &config.dataset_name).await?;
        info!(dataset_id = %id, "dataset uploaded");
        return Ok(Some(id));
    }
    Ok(config.dataset_id.clone())
}
