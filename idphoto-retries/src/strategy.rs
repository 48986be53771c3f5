//! Retry strategy trait.

use std::time::Duration;

/// What to do after a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Wait this long, then make the next attempt.
    Wait(Duration),
    /// No attempts remain.
    Exhausted,
}

impl Backoff {
    /// The wait, if any.
    pub fn delay(self) -> Option<Duration> {
        match self {
            Backoff::Wait(d) => Some(d),
            Backoff::Exhausted => None,
        }
    }
}

/// Trait for retry strategies.
pub trait RetryStrategy: Send + Sync {
    /// Decide the wait after the attempt at `attempt_index` (0-based) failed
    /// with a retryable error.
    fn next_delay(&self, attempt_index: u32) -> Backoff;

    /// Total attempts allowed, including the first.
    fn max_attempts(&self) -> u32;

    /// Check if the attempt at `attempt_index` was the last one allowed.
    fn is_exhausted(&self, attempt_index: u32) -> bool {
        attempt_index >= self.max_attempts().saturating_sub(1)
    }
}

/// Strategy that never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl NoRetry {
    /// Create a new no-retry strategy.
    pub fn new() -> Self {
        Self
    }
}

impl RetryStrategy for NoRetry {
    fn next_delay(&self, _attempt_index: u32) -> Backoff {
        Backoff::Exhausted
    }

    fn max_attempts(&self) -> u32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_retry() {
        let strategy = NoRetry::new();

        assert_eq!(strategy.next_delay(0), Backoff::Exhausted);
        assert_eq!(strategy.max_attempts(), 1);
        assert!(strategy.is_exhausted(0));
    }

    #[test]
    fn test_backoff_delay() {
        assert_eq!(
            Backoff::Wait(Duration::from_secs(1)).delay(),
            Some(Duration::from_secs(1))
        );
        assert_eq!(Backoff::Exhausted.delay(), None);
    }
}
