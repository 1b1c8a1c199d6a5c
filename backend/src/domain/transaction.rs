//! Retried, all-or-nothing execution of a unit of work.
//!
//! [`TransactionExecutor::run`] opens a store transaction, runs the unit
//! against it, and commits. Any failure rolls back, then [`classify`] decides
//! what happens next:
//!
//! - permanent failures are returned at once with the original
//!   [`StoreError`] attached;
//! - transient failures sleep for the next backoff delay and start a fresh
//!   transaction, until `max_retries` retries have been spent.
//!
//! A failed `begin` or `commit` is classified the same way as a failed
//! statement. Rollback failures are logged and never replace the error that
//! caused the rollback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tracing::{debug, error, warn};

use super::backoff::{BackoffJitter, BackoffPolicy, RandomJitter};
use super::error::RepositoryError;
use super::failure::{FailureClass, classify};
use super::ports::{StoreError, StoreTransaction, TransactionalStore};

/// Retry budget and backoff bounds for one executor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub min_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
    /// Growth factor applied per retry.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_factor: 1.25,
        }
    }
}

impl RetryConfig {
    /// Total attempts allowed, counting the first.
    ///
    /// ```rust
    /// use venue_directory::domain::RetryConfig;
    ///
    /// assert_eq!(RetryConfig::default().max_attempts(), 4);
    /// ```
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Async sleeping abstraction used between attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runtime helpers used by the retry loop.
pub struct RetryRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn RetrySleeper>,
    /// Jitter strategy for retry delays.
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for RetryRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }
}

/// Future returned by a unit of work, borrowing the open transaction.
pub type UnitFuture<'t, T> = BoxFuture<'t, Result<T, StoreError>>;

/// Runs units of work inside retried transactions.
#[derive(Clone)]
pub struct TransactionExecutor {
    store: Arc<dyn TransactionalStore>,
    backoff: BackoffPolicy,
    sleeper: Arc<dyn RetrySleeper>,
    config: RetryConfig,
}

impl TransactionExecutor {
    /// Build an executor that sleeps on the Tokio timer with random jitter.
    pub fn new(store: Arc<dyn TransactionalStore>, config: RetryConfig) -> Self {
        Self::with_runtime(store, config, RetryRuntime::default())
    }

    /// Build an executor with explicit sleep and jitter strategies.
    pub fn with_runtime(
        store: Arc<dyn TransactionalStore>,
        config: RetryConfig,
        runtime: RetryRuntime,
    ) -> Self {
        let RetryRuntime { sleeper, jitter } = runtime;
        Self {
            store,
            backoff: BackoffPolicy::from_config(&config, jitter),
            sleeper,
            config,
        }
    }

    /// Retry settings this executor was built with.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `unit` until it commits, fails permanently, or exhausts retries.
    ///
    /// `unit` is invoked once per attempt with a fresh transaction, so it
    /// must not carry state between invocations.
    ///
    /// ```rust,ignore
    /// let id = executor
    ///     .run("create_venue", move |tx| {
    ///         let venue = venue.clone();
    ///         Box::pin(async move { tx.insert_venue(&venue, created_at).await })
    ///     })
    ///     .await?;
    /// ```
    pub async fn run<T, F>(&self, operation: &'static str, mut unit: F) -> Result<T, RepositoryError>
    where
        T: Send,
        F: for<'t> FnMut(&'t mut dyn StoreTransaction) -> UnitFuture<'t, T> + Send,
    {
        let max_attempts = self.config.max_attempts();
        let mut attempt = 1;

        loop {
            let failure = match self.attempt_once(&mut unit).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            match classify(&failure) {
                FailureClass::PermanentDuplicate => {
                    debug!(operation, attempt, error = %failure, "duplicate entry");
                    return Err(RepositoryError::duplicate(operation, failure));
                }
                FailureClass::PermanentNotFound => {
                    debug!(operation, attempt, error = %failure, "no matching records");
                    return Err(RepositoryError::not_found(operation, failure));
                }
                FailureClass::Transient if attempt < max_attempts => {
                    let delay = self.backoff.next_delay(attempt - 1);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %failure,
                        "transient store failure; retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                FailureClass::Transient => {
                    error!(operation, attempts = attempt, error = %failure, "retries exhausted");
                    return Err(RepositoryError::retries_exhausted(
                        operation, attempt, failure,
                    ));
                }
            }
        }
    }

    async fn attempt_once<T, F>(&self, unit: &mut F) -> Result<T, StoreError>
    where
        T: Send,
        F: for<'t> FnMut(&'t mut dyn StoreTransaction) -> UnitFuture<'t, T> + Send,
    {
        let mut tx = self.store.begin().await?;
        match unit(tx.as_mut()).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(failure) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "rollback failed");
                }
                Err(failure)
            }
        }
    }
}
