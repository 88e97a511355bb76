// Retry policy for remote calls

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Transport-level failure classification.
///
/// Only failures that prevented obtaining a response are classified here;
/// a response with an unhappy status code is not a failure at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The call exceeded its per-attempt deadline
    Timeout,
    /// Connection could not be established
    Connect,
    /// A response arrived but its body could not be decoded
    Decode,
    /// Anything else (TLS, redirect loops, request construction)
    Other,
}

/// A failed call attempt
#[derive(Debug, Clone)]
pub struct CallFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl CallFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }
}

impl std::fmt::Display for CallFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Retry policy for a class of remote calls.
///
/// `max_retries` counts retries, not attempts: a call runs at most
/// `1 + max_retries` times. Only failure kinds listed in `retryable`
/// trigger another attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retryable: Vec<FailureKind>,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retryable: Vec<FailureKind>, delay: Duration) -> Self {
        Self {
            max_retries,
            retryable,
            delay,
        }
    }

    /// Policy that never retries
    pub fn no_retry() -> Self {
        Self::new(0, Vec::new(), Duration::ZERO)
    }

    /// Retry timeouts only, with no delay between attempts
    pub fn on_timeout(max_retries: u32) -> Self {
        Self::new(max_retries, vec![FailureKind::Timeout], Duration::ZERO)
    }

    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        self.retryable.contains(&kind)
    }
}

/// Run `attempt` under the policy, retrying retryable failures.
///
/// Returns the first success, or the last failure once retries are
/// exhausted (or the failure is not retryable).
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> std::result::Result<T, CallFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, CallFailure>>,
{
    let max_attempts = policy.max_retries + 1;
    let mut attempt_no = 1u32;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(failure) => {
                if attempt_no >= max_attempts || !policy.is_retryable(failure.kind) {
                    warn!(
                        attempt = %attempt_no,
                        kind = ?failure.kind,
                        error = %failure.message,
                        "Remote call failed"
                    );
                    return Err(failure);
                }
                info!(
                    attempt = %attempt_no,
                    max_attempts = %max_attempts,
                    kind = ?failure.kind,
                    "Retrying remote call"
                );
                if policy.delay > Duration::ZERO {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt_no += 1;
            }
        }
    }
}
