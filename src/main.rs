//! CLI entry point: run one configured workflow against the RCLC service.
//!
//! Usage: `rclc <run.toml>` with the API key in `RCLC_API_KEY`.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rclc::{run_workflow, RunConfig, RunOutcome};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let config_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: rclc <run.toml>"),
    };

    let config = RunConfig::load(&config_path)
        .with_context(|| format!("loading run file {}", config_path.display()))?;

    match run_workflow(&config).await? {
        RunOutcome::Finished {
            job_id,
            results: Some(path),
        } => {
            info!(job_id = %job_id, "all done; results are in {}", path.display());
        }
        RunOutcome::Finished {
            job_id,
            results: None,
        } => {
            info!(job_id = %job_id, "all done; the run requested no evaluation, so there is no results archive");
        }
        RunOutcome::Cancelled { job_id } => {
            info!(job_id = %job_id, "the job was cancelled by the service; no results were produced");
        }
    }
    Ok(())
}
