//! Run configuration.
//!
//! One workflow run is described by an immutable [`RunConfig`], typically
//! loaded from a TOML run file with the API key supplied via the
//! `RCLC_API_KEY` environment variable. Nothing here is process-global; the
//! config is passed by reference into every component.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::types::Id;
use crate::errors::RclcError;

/// Default service URL.
pub const DEFAULT_BASE_URL: &str = "https://rclcapi.lumina247.io";

/// Environment variable consulted first for the API key.
pub const ENV_API_KEY: &str = "RCLC_API_KEY";

/// Default polling interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 5.0;

/// Default path for the downloaded results archive.
pub const DEFAULT_RESULTS_PATH: &str = "results.zip";

/// The kind of model-building operation requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Train a new model from an uploaded dataset.
    New,
    /// Combine extra models into a base model; no dataset upload.
    Add,
    /// Augment an existing model with additional training on new data.
    Transfer,
    /// Run inference with an existing model.
    Infer,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::New => "new",
            Strategy::Add => "add",
            Strategy::Transfer => "transfer",
            Strategy::Infer => "infer",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation method applied to the held-out test split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvalType {
    NaiveBayes,
    ChiSquared,
    ChiSquaredDist,
    Fractal,
}

/// RGB channel, or combination, to train on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelPick {
    Red,
    Green,
    Blue,
    Avg,
    Combine,
}

/// Output form requested from an inference run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceStyle {
    InfToImage,
    InfToText,
    TextInfToText,
}

/// Immutable description of one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// API key; prefer supplying it via `RCLC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL of the service.
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
    pub strategy: Strategy,
    /// Local dataset archive to upload; omit to reuse `dataset_id`.
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    /// Display name for the uploaded dataset.
    #[serde(default)]
    pub dataset_name: String,
    /// Existing remote dataset to use when no archive is uploaded.
    #[serde(default)]
    pub dataset_id: Option<Id>,
    /// Name for the model the job produces.
    #[serde(default)]
    pub model_name: String,
    /// Base model for `add` and `transfer`.
    #[serde(default)]
    pub base_model_id: Option<Id>,
    /// Models folded into the base model; `add` only.
    #[serde(default)]
    pub extra_model_ids: Vec<Id>,
    /// Fraction of the dataset held out as a test split, in [0, 1].
    /// Mutually exclusive with `test_dataset_id`.
    #[serde(default)]
    pub test_size: Option<f64>,
    /// Existing dataset used for testing. Mutually exclusive with `test_size`.
    #[serde(default)]
    pub test_dataset_id: Option<Id>,
    #[serde(default)]
    pub eval_type: Option<EvalType>,
    #[serde(default)]
    pub channel_pick: Option<ChannelPick>,
    /// How granular the service should interpret a channel value.
    #[serde(default)]
    pub rcl_ticks: Option<u32>,
    /// Pixel-average folding factor; 0 disables folding.
    #[serde(default)]
    pub boxdown: u32,
    /// Collapse low-frequency patterns into an imaginary pattern during
    /// evaluation.
    #[serde(default)]
    pub imaginary: bool,
    /// Requested inference outputs; `infer` only.
    #[serde(default)]
    pub inference_style: Vec<InferenceStyle>,
    /// Model to run inference with; `infer` only.
    #[serde(default)]
    pub model_id: Option<Id>,
    /// Seconds between status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f64,
    /// Overall polling deadline in seconds; 0 polls forever.
    #[serde(default)]
    pub poll_timeout_secs: u64,
    /// Where the results archive is written.
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval() -> f64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_results_path() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_PATH)
}

impl RunConfig {
    /// Load a run file, letting the environment override the API key.
    pub fn load(path: &Path) -> Result<Self, RclcError> {
        let content = fs::read_to_string(path).map_err(|e| {
            RclcError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config: RunConfig = toml::from_str(&content).map_err(|e| {
            RclcError::config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        if let Some(key) = api_key_from_env() {
            config.api_key = Some(key);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the fields that every strategy needs before any network call.
    ///
    /// Strategy-specific requirements are enforced when the job request is
    /// built, not here.
    pub fn validate(&self) -> Result<(), RclcError> {
        url::Url::parse(&self.api_base_url).map_err(|e| {
            RclcError::config(format!("invalid api_base_url {:?}: {}", self.api_base_url, e))
        })?;
        if !self.poll_interval_secs.is_finite() || self.poll_interval_secs <= 0.0 {
            return Err(RclcError::config(format!(
                "poll_interval_secs must be a positive number, got {}",
                self.poll_interval_secs
            )));
        }
        Ok(())
    }

    /// API key for this run, or a configuration error naming where one can
    /// come from.
    pub fn api_key(&self) -> Result<&str, RclcError> {
        self.api_key
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                RclcError::config(format!(
                    "no API key configured: set {} or the api_key field",
                    ENV_API_KEY
                ))
            })
    }
}

/// Read the API key from the environment (`RCLC_API_KEY`, then `API_KEY`).
pub fn api_key_from_env() -> Option<String> {
    env::var(ENV_API_KEY)
        .ok()
        .or_else(|| env::var("API_KEY").ok())
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<RunConfig, toml::de::Error> {
        toml::from_str(content)
    }

    #[test]
    fn test_minimal_run_file_gets_defaults() {
        let config = parse(r#"strategy = "new""#).unwrap();
        assert_eq!(config.strategy, Strategy::New);
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.poll_timeout_secs, 0);
        assert_eq!(config.results_path, PathBuf::from(DEFAULT_RESULTS_PATH));
        assert!(config.test_size.is_none());
        assert!(config.extra_model_ids.is_empty());
        assert!(!config.imaginary);
    }

    #[test]
    fn test_full_run_file() {
        let config = parse(
            r#"
            strategy = "transfer"
            dataset_path = "dataset.zip"
            dataset_name = "my-dataset"
            model_name = "my-transfer-model"
            base_model_id = 42
            test_dataset_id = 7
            eval_type = "chi-squared-dist"
            channel_pick = "combine"
            rcl_ticks = 10
            boxdown = 2
            imaginary = true
            poll_interval_secs = 2.5
            results_path = "out/results.zip"
            "#,
        )
        .unwrap();
        assert_eq!(config.strategy, Strategy::Transfer);
        assert_eq!(config.base_model_id, Some(Id::Num(42)));
        assert_eq!(config.test_dataset_id, Some(Id::Num(7)));
        assert_eq!(config.eval_type, Some(EvalType::ChiSquaredDist));
        assert_eq!(config.channel_pick, Some(ChannelPick::Combine));
        assert_eq!(config.rcl_ticks, Some(10));
        assert_eq!(config.boxdown, 2);
        assert!(config.imaginary);
        assert_eq!(config.results_path, PathBuf::from("out/results.zip"));
    }

    #[test]
    fn test_string_ids_accepted() {
        let config = parse(
            r#"
            strategy = "add"
            base_model_id = "model-abc"
            extra_model_ids = [1, "model-xyz"]
            "#,
        )
        .unwrap();
        assert_eq!(config.base_model_id, Some(Id::Str("model-abc".to_string())));
        assert_eq!(
            config.extra_model_ids,
            vec![Id::Num(1), Id::Str("model-xyz".to_string())]
        );
    }

    #[test]
    fn test_unrecognized_enum_value_rejected() {
        assert!(parse(r#"strategy = "clone""#).is_err());
        assert!(parse(
            r#"
            strategy = "new"
            eval_type = "bayesian"
            "#
        )
        .is_err());
        assert!(parse(
            r#"
            strategy = "new"
            channel_pick = "alpha"
            "#
        )
        .is_err());
        assert!(parse(
            r#"
            strategy = "infer"
            inference_style = ["inftovideo"]
            "#
        )
        .is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse(
            r#"
            strategy = "new"
            testsize = 0.2
            "#
        )
        .is_err());
    }

    #[test]
    fn test_validate_rejects_bad_interval_and_url() {
        let mut config = parse(r#"strategy = "new""#).unwrap();
        config.poll_interval_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = parse(r#"strategy = "new""#).unwrap();
        config.api_base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_required() {
        let config = parse(r#"strategy = "new""#).unwrap();
        assert!(config.api_key().is_err());

        let mut config = config;
        config.api_key = Some("my-api-key".to_string());
        assert_eq!(config.api_key().unwrap(), "my-api-key");
    }

    #[test]
    fn test_inference_styles_parse() {
        let config = parse(
            r#"
            strategy = "infer"
            model_id = 39
            inference_style = ["inftoimage", "inftotext", "textinftotext"]
            "#,
        )
        .unwrap();
        assert_eq!(
            config.inference_style,
            vec![
                InferenceStyle::InfToImage,
                InferenceStyle::InfToText,
                InferenceStyle::TextInfToText
            ]
        );
    }
}
