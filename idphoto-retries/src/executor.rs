//! Retry executor for running operations with retries.

use crate::config::RetryCondition;
use crate::error::{RetryError, RetryResult};
use crate::strategy::{Backoff, RetryStrategy};
use idphoto_core::{ClassifiedError, ErrorKind};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// State of one retried operation. Dropped when the operation resolves.
#[derive(Debug, Clone, Default)]
pub struct AttemptState {
    /// Index of the current attempt (0-based).
    pub attempt_index: u32,
    /// Kind of the last failure.
    pub last_error: Option<ErrorKind>,
    /// Total time spent waiting.
    pub total_wait_time: Duration,
    /// History of attempts.
    pub history: Vec<AttemptInfo>,
}

impl AttemptState {
    /// Number of attempts that actually ran.
    pub fn attempts_made(&self) -> u32 {
        self.history.len() as u32
    }
}

/// Information about a single attempt.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Attempt index (0-based).
    pub attempt_index: u32,
    /// Kind of the failure, `None` on success.
    pub error: Option<ErrorKind>,
    /// Time waited after this attempt.
    pub wait_time: Duration,
}

/// Execute an operation with retries.
pub async fn with_retry<S, F, Fut, T>(
    strategy: &S,
    condition: RetryCondition,
    cancel: &CancellationToken,
    operation: F,
) -> RetryResult<T>
where
    S: RetryStrategy + ?Sized,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ClassifiedError>>,
{
    with_retry_state(strategy, condition, cancel, operation).await.0
}

/// Execute with retries and get state information.
///
/// Non-retryable kinds stop the loop on first occurrence. Retryable kinds
/// consult `strategy`; when it reports exhaustion the last error is returned.
/// `cancel` is checked before every attempt and races every backoff wait.
pub async fn with_retry_state<S, F, Fut, T>(
    strategy: &S,
    condition: RetryCondition,
    cancel: &CancellationToken,
    operation: F,
) -> (RetryResult<T>, AttemptState)
where
    S: RetryStrategy + ?Sized,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ClassifiedError>>,
{
    let mut state = AttemptState::default();
    let max_attempts = strategy.max_attempts();

    loop {
        if cancel.is_cancelled() {
            let err = cancelled(&state, None);
            return (Err(err), state);
        }

        debug!(
            attempt = state.attempt_index + 1,
            max_attempts, "Executing generation attempt"
        );

        let error = match operation().await {
            Ok(result) => {
                state.history.push(AttemptInfo {
                    attempt_index: state.attempt_index,
                    error: None,
                    wait_time: Duration::ZERO,
                });
                return (Ok(result), state);
            }
            Err(error) => error,
        };

        state.last_error = Some(error.kind);

        let wait = if condition.should_retry(error.kind) {
            strategy.next_delay(state.attempt_index)
        } else {
            Backoff::Exhausted
        };

        state.history.push(AttemptInfo {
            attempt_index: state.attempt_index,
            error: Some(error.kind),
            wait_time: wait.delay().unwrap_or(Duration::ZERO),
        });

        let wait = match wait {
            Backoff::Wait(wait) => wait,
            Backoff::Exhausted => {
                let exhausted = condition.should_retry(error.kind);
                warn!(
                    attempt = state.attempt_index + 1,
                    kind = %error.kind,
                    status = ?error.status,
                    exhausted,
                    "Retry exhausted or error not retryable"
                );
                let err = RetryError::Failed {
                    error,
                    attempts: state.attempts_made(),
                    exhausted,
                };
                return (Err(err), state);
            }
        };

        debug!(
            attempt = state.attempt_index + 1,
            wait_ms = wait.as_millis() as u64,
            kind = %error.kind,
            "Waiting before retry"
        );

        let wait_started = Instant::now();
        tokio::select! {
            _ = sleep(wait) => state.total_wait_time += wait,
            _ = cancel.cancelled() => {
                // Only count the part of the backoff that actually elapsed.
                let waited = wait_started.elapsed().min(wait);
                state.total_wait_time += waited;
                if let Some(last) = state.history.last_mut() {
                    last.wait_time = waited;
                }
                let err = cancelled(&state, Some(error));
                return (Err(err), state);
            }
        }

        state.attempt_index += 1;
    }
}

fn cancelled(state: &AttemptState, last_error: Option<ClassifiedError>) -> RetryError {
    debug!(attempts = state.attempts_made(), "Retry loop cancelled");
    RetryError::Cancelled {
        attempts: state.attempts_made(),
        last_error,
    }
}
