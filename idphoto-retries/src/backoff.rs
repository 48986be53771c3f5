//! Exponential backoff with additive jitter.
//!
//! The delay after the attempt at index `i` fails is
//! `base * 2^i + random(0..=jitter_window)`.

use crate::config::RetryConfig;
use crate::strategy::{Backoff, RetryStrategy};
use rand::Rng;
use std::time::Duration;

/// Exponential backoff with additive jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialBackoff {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub base: Duration,
    /// Upper bound of the added jitter.
    pub jitter_window: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a retry config.
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base: config.base_backoff_duration(),
            jitter_window: config.jitter_window_duration(),
        }
    }

    /// Set total attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay.
    #[must_use]
    pub fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    /// Set the jitter window.
    #[must_use]
    pub fn with_jitter_window(mut self, window: Duration) -> Self {
        self.jitter_window = window;
        self
    }

    /// `base * 2^attempt_index`, saturating.
    pub fn exponential_part(&self, attempt_index: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }

    /// Largest delay the jitter can produce for an attempt.
    pub fn delay_ceiling(&self, attempt_index: u32) -> Duration {
        self.exponential_part(attempt_index)
            .saturating_add(self.jitter_window)
    }

    /// Calculate the delay for an attempt using the thread RNG.
    pub fn calculate_delay(&self, attempt_index: u32) -> Duration {
        self.calculate_delay_with(attempt_index, &mut rand::thread_rng())
    }

    /// Calculate the delay for an attempt using the given RNG.
    pub fn calculate_delay_with<R: Rng>(&self, attempt_index: u32, rng: &mut R) -> Duration {
        let window_ms = self.jitter_window.as_millis().min(u128::from(u64::MAX)) as u64;
        let jitter_ms = if window_ms == 0 {
            0
        } else {
            rng.gen_range(0..=window_ms)
        };
        self.exponential_part(attempt_index)
            .saturating_add(Duration::from_millis(jitter_ms))
    }

    /// Worst-case total wait across all retries.
    pub fn max_total_wait(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|i| self.delay_ceiling(i))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt_index: u32) -> Backoff {
        if self.is_exhausted(attempt_index) {
            return Backoff::Exhausted;
        }
        Backoff::Wait(self.calculate_delay(attempt_index))
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn no_jitter() -> ExponentialBackoff {
        ExponentialBackoff::new()
            .with_base(Duration::from_millis(100))
            .with_jitter_window(Duration::ZERO)
            .with_max_attempts(5)
    }

    #[test]
    fn test_defaults_follow_config() {
        let backoff = ExponentialBackoff::new();
        assert_eq!(backoff.max_attempts, 3);
        assert_eq!(backoff.base, Duration::from_millis(2000));
        assert_eq!(backoff.jitter_window, Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_doubles_without_jitter() {
        let backoff = no_jitter();

        assert_eq!(backoff.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(backoff.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(backoff.calculate_delay(2), Duration::from_millis(400));
        assert_eq!(backoff.calculate_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_strictly_increasing_without_jitter() {
        let backoff = no_jitter();
        let delays: Vec<_> = (0..10).map(|i| backoff.calculate_delay(i)).collect();
        assert!(delays.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_delay_bounded_by_ceiling() {
        let backoff = ExponentialBackoff::new();
        let mut rng = StdRng::seed_from_u64(7);

        for attempt in 0..4 {
            for _ in 0..200 {
                let delay = backoff.calculate_delay_with(attempt, &mut rng);
                assert!(delay >= backoff.exponential_part(attempt));
                assert!(delay <= backoff.delay_ceiling(attempt));
            }
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let backoff = ExponentialBackoff::new();
        let a = backoff.calculate_delay_with(1, &mut StdRng::seed_from_u64(42));
        let b = backoff.calculate_delay_with(1, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_next_delay_exhausts_on_last_attempt() {
        let backoff = no_jitter().with_max_attempts(3);

        assert_eq!(
            backoff.next_delay(0),
            Backoff::Wait(Duration::from_millis(100))
        );
        assert_eq!(
            backoff.next_delay(1),
            Backoff::Wait(Duration::from_millis(200))
        );
        assert_eq!(backoff.next_delay(2), Backoff::Exhausted);
        assert_eq!(backoff.next_delay(7), Backoff::Exhausted);
    }

    #[test]
    fn test_single_attempt_never_waits() {
        let backoff = no_jitter().with_max_attempts(1);
        assert_eq!(backoff.next_delay(0), Backoff::Exhausted);
        assert_eq!(backoff.max_total_wait(), Duration::ZERO);
    }

    #[test]
    fn test_max_total_wait() {
        // (2000 + 1000) + (4000 + 1000)
        let backoff = ExponentialBackoff::new();
        assert_eq!(backoff.max_total_wait(), Duration::from_millis(8000));
    }

    #[test]
    fn test_large_attempt_saturates() {
        let backoff = no_jitter();
        assert!(backoff.calculate_delay(64) >= backoff.calculate_delay(31));
    }
}
