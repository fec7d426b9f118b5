//! RCLC API client.
//!
//! # Example
//!
//! ```ignore
//! use rclc::api::client::RclcClient;
//! use rclc::api::types::JobRequest;
//! use rclc::polling::PollConfig;
//!
//! let client = RclcClient::from_env()?;
//!
//! let dataset_id = client.datasets().upload(path, "my-dataset-name").await?;
//! let request = JobRequest::build(&config, Some(dataset_id))?;
//! let job_id = client.jobs().submit(&request).await?;
//!
//! let polled = client.jobs().poll_until_terminal(&job_id, &PollConfig::default()).await?;
//! if !polled.aborted && request.wants_results() {
//!     client.results().download_to(&job_id, &config.results_path).await?;
//! }
//! ```

pub mod client;
pub mod datasets;
pub mod jobs;
pub mod results;
pub mod types;

pub use client::RclcClient;
pub use datasets::DatasetsClient;
pub use jobs::{JobsClient, PolledJob};
pub use results::ResultsClient;
pub use types::{
    DatasetUploadResponse, Id, InferenceJobRequest, JobRequest, JobSubmitResponse,
    TrainingJobRequest,
};
