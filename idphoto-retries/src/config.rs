//! Retry configuration.

use idphoto_core::ErrorKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds. Doubles per attempt.
    pub base_backoff_ms: u64,
    /// Upper bound of the random jitter added to each delay, in milliseconds.
    pub jitter_window_ms: u64,
    /// Treat transport failures as transient.
    pub retry_transport_errors: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 2000,
            jitter_window_ms: 1000,
            retry_transport_errors: false,
        }
    }
}

impl RetryConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set total attempts.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base backoff.
    pub fn base_backoff(mut self, base: Duration) -> Self {
        self.base_backoff_ms = base.as_millis().min(u128::from(u64::MAX)) as u64;
        self
    }

    /// Set the jitter window.
    pub fn jitter_window(mut self, window: Duration) -> Self {
        self.jitter_window_ms = window.as_millis().min(u128::from(u64::MAX)) as u64;
        self
    }

    /// Retry transport failures too.
    pub fn retry_transport_errors(mut self, enabled: bool) -> Self {
        self.retry_transport_errors = enabled;
        self
    }

    /// Config that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new().max_attempts(1)
    }

    /// Base backoff as a duration.
    pub fn base_backoff_duration(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    /// Jitter window as a duration.
    pub fn jitter_window_duration(&self) -> Duration {
        Duration::from_millis(self.jitter_window_ms)
    }

    /// The condition derived from this config.
    pub fn condition(&self) -> RetryCondition {
        RetryCondition {
            on_transport_errors: self.retry_transport_errors,
        }
    }
}

/// Which error kinds are retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryCondition {
    /// Retry `TransportError` in addition to the transient kinds.
    pub on_transport_errors: bool,
}

impl RetryCondition {
    /// Quota and overload failures only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also retry transport failures.
    pub fn on_transport_errors(mut self) -> Self {
        self.on_transport_errors = true;
        self
    }

    /// Check if an error kind should be retried.
    pub fn should_retry(&self, kind: ErrorKind) -> bool {
        kind.is_transient() || (self.on_transport_errors && kind == ErrorKind::TransportError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_backoff_duration(), Duration::from_secs(2));
        assert_eq!(config.jitter_window_duration(), Duration::from_secs(1));
        assert!(!config.retry_transport_errors);
    }

    #[test]
    fn test_config_builder() {
        let config = RetryConfig::new()
            .max_attempts(5)
            .base_backoff(Duration::from_millis(250))
            .jitter_window(Duration::ZERO)
            .retry_transport_errors(true);

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_backoff_ms, 250);
        assert_eq!(config.jitter_window_ms, 0);
        assert!(config.condition().on_transport_errors);
    }

    #[test]
    fn test_default_condition() {
        let condition = RetryCondition::new();
        assert!(condition.should_retry(ErrorKind::QuotaExceeded));
        assert!(condition.should_retry(ErrorKind::ServiceOverloaded));
        assert!(!condition.should_retry(ErrorKind::TransportError));
        assert!(!condition.should_retry(ErrorKind::AuthError));
        assert!(!condition.should_retry(ErrorKind::MalformedResponse));
        assert!(!condition.should_retry(ErrorKind::Unknown));
    }

    #[test]
    fn test_transport_condition() {
        let condition = RetryCondition::new().on_transport_errors();
        assert!(condition.should_retry(ErrorKind::TransportError));
        assert!(!condition.should_retry(ErrorKind::AuthError));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RetryConfig = serde_json::from_str(r#"{"max_attempts": 5}"#).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_backoff_ms, 2000);
    }

    #[test]
    fn test_no_retry() {
        assert_eq!(RetryConfig::no_retry().max_attempts, 1);
    }
}
