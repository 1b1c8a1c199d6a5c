//! Retry settings loaded via OrthoConfig.
//!
//! Each field defaults to the matching [`RetryConfig`] default, so an
//! environment with no overrides still loads.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::RetryConfig;

/// Overrides for the transaction retry budget and backoff curve.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DIRECTORY_RETRY")]
pub struct RetrySettings {
    /// Retries allowed after the first attempt.
    #[ortho_config(default = 3)]
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    #[ortho_config(default = 100)]
    pub min_backoff_ms: u64,
    /// Upper bound for a single delay, in milliseconds.
    #[ortho_config(default = 10_000)]
    pub max_backoff_ms: u64,
    /// Growth factor applied per retry.
    #[ortho_config(default = 1.25)]
    pub backoff_factor: f64,
}

impl RetrySettings {
    /// Convert into the executor's retry configuration.
    ///
    /// A non-finite or non-positive factor falls back to the default.
    pub fn retry_config(&self) -> RetryConfig {
        let defaults = RetryConfig::default();
        let factor = self.backoff_factor;
        RetryConfig {
            max_retries: self.max_retries,
            min_backoff: Duration::from_millis(self.min_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_factor: if factor.is_finite() && factor > 0.0 {
                factor
            } else {
                defaults.backoff_factor
            },
        }
    }
}
