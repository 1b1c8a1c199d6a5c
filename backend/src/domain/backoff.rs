//! Jittered exponential backoff between transaction attempts.
//!
//! The base delay grows as `min * factor^retry` and never exceeds `max`.
//! Jitter scales the base multiplicatively so concurrent callers that failed
//! together do not retry in lockstep; the jittered value is capped at `max`
//! again.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use super::transaction::RetryConfig;

/// Half-width of the multiplicative jitter band applied by [`RandomJitter`].
pub const JITTER_SPREAD: f64 = 0.25;

/// Retry backoff jitter abstraction.
pub trait BackoffJitter: Send + Sync {
    /// Return a jittered delay derived from `base`.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use venue_directory::domain::BackoffJitter;
    ///
    /// struct Halving;
    /// impl BackoffJitter for Halving {
    ///     fn jittered_delay(&self, base: Duration) -> Duration {
    ///         base / 2
    ///     }
    /// }
    ///
    /// assert_eq!(Halving.jittered_delay(Duration::from_millis(100)), Duration::from_millis(50));
    /// ```
    fn jittered_delay(&self, base: Duration) -> Duration;
}

/// Uniform jitter in `[1 - JITTER_SPREAD, 1 + JITTER_SPREAD)` of the base.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl BackoffJitter for RandomJitter {
    fn jittered_delay(&self, base: Duration) -> Duration {
        let scale = rand::thread_rng().gen_range((1.0 - JITTER_SPREAD)..(1.0 + JITTER_SPREAD));
        Duration::try_from_secs_f64(base.as_secs_f64() * scale).unwrap_or(base)
    }
}

/// Delay schedule for retries of one operation.
#[derive(Clone)]
pub struct BackoffPolicy {
    min: Duration,
    max: Duration,
    factor: f64,
    jitter: Arc<dyn BackoffJitter>,
}

impl BackoffPolicy {
    /// Build a policy from explicit bounds.
    ///
    /// A `max` below `min` is raised to `min`.
    pub fn new(min: Duration, max: Duration, factor: f64, jitter: Arc<dyn BackoffJitter>) -> Self {
        Self {
            min,
            max: max.max(min),
            factor,
            jitter,
        }
    }

    /// Build a policy from the retry settings of an executor.
    pub fn from_config(config: &RetryConfig, jitter: Arc<dyn BackoffJitter>) -> Self {
        Self::new(
            config.min_backoff,
            config.max_backoff,
            config.backoff_factor,
            jitter,
        )
    }

    /// Un-jittered delay before retry number `retry` (zero-based).
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use venue_directory::domain::{BackoffPolicy, RandomJitter};
    ///
    /// let policy = BackoffPolicy::new(
    ///     Duration::from_millis(100),
    ///     Duration::from_secs(10),
    ///     2.0,
    ///     Arc::new(RandomJitter),
    /// );
    /// assert_eq!(policy.base_delay(0), Duration::from_millis(100));
    /// assert_eq!(policy.base_delay(3), Duration::from_millis(800));
    /// assert_eq!(policy.base_delay(40), Duration::from_secs(10));
    /// ```
    pub fn base_delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let growth = self.factor.powi(exponent);
        let seconds = self.min.as_secs_f64() * growth;
        if !seconds.is_finite() || seconds < 0.0 {
            return self.max;
        }
        Duration::try_from_secs_f64(seconds)
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Jittered delay before retry number `retry`, never above `max`.
    pub fn next_delay(&self, retry: u32) -> Duration {
        self.jitter
            .jittered_delay(self.base_delay(retry))
            .min(self.max)
    }
}

impl fmt::Debug for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffPolicy")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("factor", &self.factor)
            .finish_non_exhaustive()
    }
}
