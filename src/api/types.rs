//! Wire types and request construction.
//!
//! [`JobRequest::build`] is the single place where a run configuration turns
//! into a submission payload, and the single place the per-strategy field
//! requirements and the `test_size` / `test_dataset_id` exclusivity are
//! enforced. A built request is immutable; whether results are retrieved
//! later is decided by [`JobRequest::wants_results`] on the request as it
//! was submitted, never by anything the service reports back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ChannelPick, EvalType, InferenceStyle, RunConfig, Strategy};
use crate::errors::RclcError;

/// Opaque identifier assigned by the service.
///
/// The service hands out both numeric and string ids; either round-trips
/// unchanged on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Num(i64),
    Str(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Num(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Str(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Str(s)
    }
}

/// Response from `POST /datasets`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetUploadResponse {
    pub dataset_id: Id,
}

/// Response from `POST /models` and `POST /inferences`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSubmitResponse {
    pub job_id: Id,
}

/// Payload for `POST /models`.
///
/// Optional fields are omitted from the JSON entirely when unset; the
/// service treats key presence as meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJobRequest {
    pub strategy: Strategy,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_model_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_model_ids: Option<Vec<Id>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_dataset_id: Option<Id>,
    pub eval_type: EvalType,
    pub channel_pick: ChannelPick,
    pub rcl_ticks: u32,
    pub boxdown: u32,
    pub imaginary: bool,
}

/// Payload for `POST /inferences`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceJobRequest {
    pub dataset_id: Id,
    pub model_id: Id,
    pub inference_style: Vec<InferenceStyle>,
}

/// A built job request. Immutable once constructed.
#[derive(Debug, Clone)]
pub enum JobRequest {
    Training(TrainingJobRequest),
    Inference(InferenceJobRequest),
}

impl JobRequest {
    /// Build the submission payload for one run.
    ///
    /// `dataset_id` is the id produced by the upload step (or configured
    /// directly); every strategy except `add` requires one. Fails with a
    /// configuration error, before any network call, when the strategy's
    /// required fields are missing or the evaluation fields conflict.
    pub fn build(config: &RunConfig, dataset_id: Option<Id>) -> Result<Self, RclcError> {
        if config.test_size.is_some() && config.test_dataset_id.is_some() {
            return Err(RclcError::config(
                "test_size and test_dataset_id are mutually exclusive; set at most one",
            ));
        }
        if let Some(size) = config.test_size {
            if !(0.0..=1.0).contains(&size) {
                return Err(RclcError::config(format!(
                    "test_size must be within [0, 1], got {}",
                    size
                )));
            }
        }

        match config.strategy {
            Strategy::New => {
                let mut request = training_base(config, Strategy::New)?;
                request.dataset_id = Some(require_dataset(dataset_id, Strategy::New)?);
                Ok(JobRequest::Training(request))
            }
            Strategy::Add => {
                let mut request = training_base(config, Strategy::Add)?;
                request.base_model_id = Some(require(
                    config.base_model_id.clone(),
                    Strategy::Add,
                    "base_model_id",
                )?);
                if config.extra_model_ids.is_empty() {
                    return Err(RclcError::config(
                        "the add strategy requires a non-empty extra_model_ids list",
                    ));
                }
                request.extra_model_ids = Some(config.extra_model_ids.clone());
                Ok(JobRequest::Training(request))
            }
            Strategy::Transfer => {
                let mut request = training_base(config, Strategy::Transfer)?;
                request.base_model_id = Some(require(
                    config.base_model_id.clone(),
                    Strategy::Transfer,
                    "base_model_id",
                )?);
                request.dataset_id = Some(require_dataset(dataset_id, Strategy::Transfer)?);
                Ok(JobRequest::Training(request))
            }
            Strategy::Infer => {
                let dataset_id = require_dataset(dataset_id, Strategy::Infer)?;
                let model_id = require(config.model_id.clone(), Strategy::Infer, "model_id")?;
                if config.inference_style.is_empty() {
                    return Err(RclcError::config(
                        "the infer strategy requires at least one inference_style",
                    ));
                }
                Ok(JobRequest::Inference(InferenceJobRequest {
                    dataset_id,
                    model_id,
                    inference_style: config.inference_style.clone(),
                }))
            }
        }
    }

    /// Whether a finished job should have its result artifact retrieved.
    ///
    /// Training runs download results only when the submitted request carried
    /// an evaluation field; inference runs always produce a downloadable
    /// result.
    pub fn wants_results(&self) -> bool {
        match self {
            JobRequest::Training(r) => r.test_size.is_some() || r.test_dataset_id.is_some(),
            JobRequest::Inference(_) => true,
        }
    }
}

fn training_base(config: &RunConfig, strategy: Strategy) -> Result<TrainingJobRequest, RclcError> {
    let eval_type = require(config.eval_type, strategy, "eval_type")?;
    let channel_pick = require(config.channel_pick, strategy, "channel_pick")?;
    let rcl_ticks = require(config.rcl_ticks, strategy, "rcl_ticks")?;
    if rcl_ticks == 0 {
        return Err(RclcError::config("rcl_ticks must be a positive integer"));
    }

    Ok(TrainingJobRequest {
        strategy,
        name: config.model_name.clone(),
        dataset_id: None,
        base_model_id: None,
        extra_model_ids: None,
        test_size: config.test_size,
        test_dataset_id: config.test_dataset_id.clone(),
        eval_type,
        channel_pick,
        rcl_ticks,
        boxdown: config.boxdown,
        imaginary: config.imaginary,
    })
}

fn require<T>(value: Option<T>, strategy: Strategy, field: &str) -> Result<T, RclcError> {
    value.ok_or_else(|| {
        RclcError::config(format!("the {} strategy requires {}", strategy, field))
    })
}

fn require_dataset(dataset_id: Option<Id>, strategy: Strategy) -> Result<Id, RclcError> {
    dataset_id.ok_or_else(|| {
        RclcError::config(format!(
            "the {} strategy requires a dataset: set dataset_path or dataset_id",
            strategy
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(strategy: Strategy) -> RunConfig {
        let mut config: RunConfig =
            toml::from_str(&format!(r#"strategy = "{}""#, strategy)).unwrap();
        config.model_name = "my-model-name".to_string();
        config.eval_type = Some(EvalType::NaiveBayes);
        config.channel_pick = Some(ChannelPick::Combine);
        config.rcl_ticks = Some(10);
        config
    }

    #[test]
    fn test_eval_fields_are_mutually_exclusive_for_every_strategy() {
        for strategy in [Strategy::New, Strategy::Add, Strategy::Transfer, Strategy::Infer] {
            let mut config = base_config(strategy);
            config.base_model_id = Some(Id::Num(1));
            config.extra_model_ids = vec![Id::Num(2)];
            config.model_id = Some(Id::Num(3));
            config.inference_style = vec![InferenceStyle::InfToImage];
            config.test_size = Some(0.2);
            config.test_dataset_id = Some(Id::Num(7));

            let err = JobRequest::build(&config, Some(Id::Num(100))).unwrap_err();
            assert!(
                matches!(err, RclcError::Config(_)),
                "{} accepted conflicting eval fields",
                strategy
            );
        }
    }

    #[test]
    fn test_neither_eval_field_means_train_only() {
        let request = JobRequest::build(&base_config(Strategy::New), Some(Id::Num(100))).unwrap();
        assert!(!request.wants_results());
    }

    #[test]
    fn test_test_size_range() {
        let mut config = base_config(Strategy::New);
        config.test_size = Some(1.5);
        assert!(JobRequest::build(&config, Some(Id::Num(100))).is_err());

        config.test_size = Some(1.0);
        assert!(JobRequest::build(&config, Some(Id::Num(100))).is_ok());
    }

    #[test]
    fn test_new_requires_dataset() {
        let err = JobRequest::build(&base_config(Strategy::New), None).unwrap_err();
        assert!(matches!(err, RclcError::Config(_)));
    }

    #[test]
    fn test_add_requires_base_and_extras() {
        let mut config = base_config(Strategy::Add);
        assert!(JobRequest::build(&config, None).is_err());

        config.base_model_id = Some(Id::Str("base".to_string()));
        // Still no extra models.
        assert!(JobRequest::build(&config, None).is_err());

        config.extra_model_ids = vec![Id::Num(1), Id::Num(2)];
        let request = JobRequest::build(&config, None).unwrap();
        match request {
            JobRequest::Training(r) => {
                assert_eq!(r.extra_model_ids, Some(vec![Id::Num(1), Id::Num(2)]));
                assert!(r.dataset_id.is_none());
            }
            JobRequest::Inference(_) => panic!("add built an inference request"),
        }
    }

    #[test]
    fn test_transfer_requires_base_model_and_dataset() {
        let mut config = base_config(Strategy::Transfer);
        config.base_model_id = Some(Id::Num(42));
        assert!(JobRequest::build(&config, None).is_err());

        config.base_model_id = None;
        assert!(JobRequest::build(&config, Some(Id::Num(100))).is_err());

        config.base_model_id = Some(Id::Num(42));
        assert!(JobRequest::build(&config, Some(Id::Num(100))).is_ok());
    }

    #[test]
    fn test_infer_requirements() {
        let mut config = base_config(Strategy::Infer);
        config.model_id = Some(Id::Num(39));
        // Empty inference_style set.
        assert!(JobRequest::build(&config, Some(Id::Num(100))).is_err());

        config.inference_style = vec![InferenceStyle::InfToImage];
        let request = JobRequest::build(&config, Some(Id::Num(100))).unwrap();
        assert!(request.wants_results());

        config.model_id = None;
        assert!(JobRequest::build(&config, Some(Id::Num(100))).is_err());
    }

    #[test]
    fn test_training_serialization_has_exactly_the_set_fields() {
        let mut config = base_config(Strategy::New);
        config.test_size = Some(0.2);
        config.boxdown = 0;
        config.imaginary = false;

        let request = JobRequest::build(&config, Some(Id::Num(100))).unwrap();
        assert!(request.wants_results());

        let body = match request {
            JobRequest::Training(r) => serde_json::to_value(&r).unwrap(),
            JobRequest::Inference(_) => panic!("new built an inference request"),
        };
        let object = body.as_object().unwrap();

        assert_eq!(body["strategy"], "new");
        assert_eq!(body["name"], "my-model-name");
        assert_eq!(body["dataset_id"], 100);
        assert_eq!(body["test_size"], 0.2);
        assert_eq!(body["eval_type"], "naive-bayes");
        assert_eq!(body["channel_pick"], "combine");
        assert_eq!(body["rcl_ticks"], 10);
        assert_eq!(body["boxdown"], 0);
        assert_eq!(body["imaginary"], false);
        assert!(!object.contains_key("test_dataset_id"));
        assert!(!object.contains_key("base_model_id"));
        assert!(!object.contains_key("extra_model_ids"));
        assert_eq!(object.len(), 9);
    }

    #[test]
    fn test_wants_results_follows_submitted_fields() {
        let mut config = base_config(Strategy::Add);
        config.base_model_id = Some(Id::Num(1));
        config.extra_model_ids = vec![Id::Num(2)];

        let plain = JobRequest::build(&config, None).unwrap();
        assert!(!plain.wants_results());

        config.test_size = Some(0.1);
        let with_split = JobRequest::build(&config, None).unwrap();
        assert!(with_split.wants_results());

        config.test_size = None;
        config.test_dataset_id = Some(Id::Num(7));
        let with_dataset = JobRequest::build(&config, None).unwrap();
        assert!(with_dataset.wants_results());
    }

    #[test]
    fn test_id_round_trips_numbers_and_strings() {
        let num: Id = serde_json::from_str("100").unwrap();
        assert_eq!(num, Id::Num(100));
        assert_eq!(serde_json::to_string(&num).unwrap(), "100");

        let name: Id = serde_json::from_str("\"ds-100\"").unwrap();
        assert_eq!(name, Id::Str("ds-100".to_string()));
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"ds-100\"");

        assert_eq!(Id::Num(500).to_string(), "500");
        assert_eq!(Id::from("job-500").to_string(), "job-500");
    }
}
