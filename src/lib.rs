//! Client for the RCLC training and inference API.
//!
//! The crate drives the service's job lifecycle end to end: upload a dataset
//! archive, submit a training or inference job, poll it until it reaches a
//! terminal state, and download the results archive when the run calls for
//! one.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use rclc::{run_workflow, RunConfig, RunOutcome};
//!
//! let config = RunConfig::load(Path::new("run.toml"))?;
//! match run_workflow(&config).await? {
//!     RunOutcome::Finished { results: Some(path), .. } => {
//!         println!("results are in {}", path.display());
//!     }
//!     outcome => println!("{:?}", outcome),
//! }
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod jobs;
pub mod polling;
pub mod run;

// Re-export the workflow surface at the crate root for convenience.
pub use api::client::RclcClient;
pub use api::jobs::PolledJob;
pub use api::types::{Id, InferenceJobRequest, JobRequest, TrainingJobRequest};
pub use config::{
    ChannelPick, EvalType, InferenceStyle, RunConfig, Strategy, DEFAULT_BASE_URL, ENV_API_KEY,
};
pub use errors::{FailureDetail, RclcError, RclcResult};
pub use jobs::{JobSnapshot, JobStatus};
pub use polling::{BackoffConfig, PollConfig, PollState};
pub use run::{run_workflow, run_workflow_with, RunOutcome};
