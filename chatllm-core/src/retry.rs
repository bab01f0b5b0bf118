//! Retry policy and attempt bookkeeping
//!
//! Retries are a fixed attempt budget. There is no backoff curve and no
//! rate limiting: a failed attempt is followed immediately by the next one,
//! or after a fixed pause when one is configured.

use crate::http::error::TransportError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single attempt did not produce content
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The request never produced a status
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The endpoint answered with something other than 200
    #[error("unexpected status code {0}")]
    Status(u16),

    /// Status 200, but no content could be extracted from the body
    #[error("no content found in response body")]
    Extraction,
}

impl AttemptFailure {
    /// Status code observed for this attempt, if a response arrived
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::Status(code) => Some(*code),
            Self::Extraction => Some(crate::http::STATUS_OK),
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first; never below 1
    pub max_attempts: u32,

    /// Pause between a failed attempt and the next one (milliseconds)
    pub pause_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pause_ms: 0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy allowing `max_attempts` attempts; 0 is treated as 1
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            pause_ms: 0,
        }
    }

    /// Create a policy from a signed count, as received over the C ABI
    pub fn from_signed(max_attempts: i64) -> Self {
        Self::new(max_attempts.clamp(0, i64::from(u32::MAX)) as u32)
    }

    /// Create a policy with a single attempt
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    /// Set the pause between attempts
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_ms = u64::try_from(pause.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Effective attempt limit
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Pause between attempts
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

/// Result of a retry operation
#[derive(Debug, Clone)]
pub struct RetryResult<T> {
    /// The successful result (if any)
    pub result: Option<T>,

    /// Number of attempts made
    pub attempts: u32,

    /// Failures in attempt order
    pub failures: Vec<AttemptFailure>,
}

/// Executor for retry operations
pub struct RetryExecutor {
    policy: RetryPolicy,
    diagnostics: bool,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            diagnostics: false,
        }
    }

    /// Report each failed attempt at WARN level instead of DEBUG
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    ///
    /// The operation receives the 1-based attempt number. Attempts run one
    /// after another; nothing from a failed attempt is carried into the next.
    pub async fn execute<F, T, Fut>(&self, mut operation: F) -> RetryResult<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptFailure>>,
    {
        let max_attempts = self.policy.attempts();
        let mut failures = Vec::new();

        for attempt in 1..=max_attempts {
            match operation(attempt).await {
                Ok(result) => {
                    return RetryResult {
                        result: Some(result),
                        attempts: attempt,
                        failures,
                    };
                }
                Err(failure) => {
                    self.report(attempt, max_attempts, &failure);
                    failures.push(failure);

                    let pause = self.policy.pause();
                    if attempt < max_attempts && !pause.is_zero() {
                        tokio::time::sleep(pause).await;
                    }
                }
            }
        }

        RetryResult {
            result: None,
            attempts: max_attempts,
            failures,
        }
    }

    fn report(&self, attempt: u32, max_attempts: u32, failure: &AttemptFailure) {
        let code = failure.status_code().unwrap_or(0);
        if self.diagnostics {
            warn!(
                attempt,
                max_attempts,
                code,
                error = %failure,
                "Attempt {}/{} failed. Code: {}",
                attempt,
                max_attempts,
                code
            );
        } else {
            debug!(attempt, max_attempts, code, error = %failure, "attempt failed");
        }
    }
}
