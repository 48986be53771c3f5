//! # idphoto-retries
//!
//! Backoff and retry execution for idphoto generation calls.
//!
//! Decisions are pure: [`RetryCondition`] says whether an
//! [`ErrorKind`](idphoto_core::ErrorKind) is retried, and a [`RetryStrategy`]
//! says how long to wait or that attempts are [`Backoff::Exhausted`]. Only the
//! executor sleeps.
//!
//! ## Core Concepts
//!
//! - **[`RetryConfig`]**: attempt bound, base backoff, jitter window
//! - **[`ExponentialBackoff`]**: `base * 2^i + random(0..=jitter)`
//! - **[`with_retry`]**: run an operation until success or a terminal error,
//!   cancellable through a `CancellationToken`
//!
//! ## Example
//!
//! ```ignore
//! use idphoto_retries::{with_retry, ExponentialBackoff, RetryConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = RetryConfig::new().max_attempts(3);
//! let backoff = ExponentialBackoff::from_config(&config);
//! let cancel = CancellationToken::new();
//!
//! let result = with_retry(&backoff, config.condition(), &cancel, || async {
//!     call_service().await
//! }).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod error;
pub mod executor;
pub mod strategy;

// Re-exports
pub use backoff::ExponentialBackoff;
pub use config::{RetryCondition, RetryConfig};
pub use error::{RetryError, RetryResult};
pub use executor::{with_retry, with_retry_state, AttemptInfo, AttemptState};
pub use strategy::{Backoff, NoRetry, RetryStrategy};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        with_retry, Backoff, ExponentialBackoff, RetryConfig, RetryError, RetryResult,
        RetryStrategy,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let config = RetryConfig::new().max_attempts(5);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(ExponentialBackoff::from_config(&config).max_attempts, 5);
    }

    #[test]
    fn test_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_backoff_from_config() {
        let config = RetryConfig::new()
            .base_backoff(Duration::from_millis(500))
            .jitter_window(Duration::from_millis(50));
        let backoff = ExponentialBackoff::from_config(&config);
        assert_eq!(backoff.base, Duration::from_millis(500));
        assert_eq!(backoff.jitter_window, Duration::from_millis(50));
    }
}
