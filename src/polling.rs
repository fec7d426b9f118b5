//! Polling state machine.
//!
//! The poll loop itself lives in [`crate::api::jobs::JobsClient`]; this
//! module holds the pure pieces (interval and backoff arithmetic, the
//! transient-error budget, the optional deadline) so the decision logic is
//! testable without a clock or a service.

use std::time::{Duration, Instant};

/// Configuration for exponential backoff after failed status queries.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Base interval in milliseconds.
    pub base_interval_ms: u64,
    /// Maximum backoff in milliseconds.
    pub max_backoff_ms: u64,
    /// Maximum exponent for the backoff multiplier.
    pub max_exponent: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 5000,
            max_backoff_ms: 60000,
            max_exponent: 4,
        }
    }
}

impl BackoffConfig {
    pub fn new(base_interval_ms: u64, max_backoff_ms: u64, max_exponent: u32) -> Self {
        Self {
            base_interval_ms,
            max_backoff_ms,
            max_exponent,
        }
    }
}

/// Calculate the backoff delay for a given number of consecutive failures.
///
/// Formula: `min(base * 2^min(consecutive-1, max_exponent), max_backoff)`.
pub fn calculate_backoff(config: &BackoffConfig, consecutive_failures: u32) -> Duration {
    if consecutive_failures == 0 {
        return Duration::from_millis(config.base_interval_ms);
    }

    let exponent = consecutive_failures
        .saturating_sub(1)
        .min(config.max_exponent);
    let multiplier = 2u64.saturating_pow(exponent);
    let delay_ms = config
        .base_interval_ms
        .saturating_mul(multiplier)
        .min(config.max_backoff_ms);

    Duration::from_millis(delay_ms)
}

/// Configuration for a poll-until-terminal loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Interval between successful status queries.
    pub interval: Duration,
    /// Backoff applied after transient query failures.
    pub backoff: BackoffConfig,
    /// Consecutive transient failures tolerated before giving up.
    pub max_consecutive_errors: u32,
    /// Overall deadline; `None` polls forever.
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            backoff: BackoffConfig::default(),
            max_consecutive_errors: 5,
            deadline: None,
        }
    }
}

impl PollConfig {
    /// Config polling at `interval`, with everything else at defaults.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}

/// State tracker for one polling loop.
#[derive(Debug)]
pub struct PollState {
    consecutive_errors: u32,
    total_attempts: u32,
    started: Instant,
    config: PollConfig,
}

impl PollState {
    pub fn new(config: PollConfig) -> Self {
        Self {
            consecutive_errors: 0,
            total_attempts: 0,
            started: Instant::now(),
            config,
        }
    }

    /// Record a successful status query (resets the error streak).
    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
        self.total_attempts += 1;
    }

    /// Record a failed status query.
    pub fn record_error(&mut self) {
        self.consecutive_errors += 1;
        self.total_attempts += 1;
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    /// Check if the transient-error budget is exhausted.
    pub fn should_give_up(&self) -> bool {
        self.consecutive_errors >= self.config.max_consecutive_errors
    }

    /// Check if the overall deadline has elapsed.
    pub fn is_timed_out(&self) -> bool {
        match self.config.deadline {
            Some(deadline) => self.started.elapsed() >= deadline,
            None => false,
        }
    }

    /// The delay to wait before the next query: the plain interval after a
    /// success, exponential backoff while the error streak lasts.
    pub fn next_delay(&self) -> Duration {
        if self.consecutive_errors > 0 {
            calculate_backoff(&self.config.backoff, self.consecutive_errors)
        } else {
            self.config.interval
        }
    }
}
