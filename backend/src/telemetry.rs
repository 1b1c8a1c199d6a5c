//! Structured logging setup.
//!
//! Hosts that embed the directory call [`init_tracing`] once at start-up.
//! Output is JSON, filtered through `RUST_LOG`.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

/// Failure to install the global subscriber.
#[derive(Debug, Error)]
#[error("tracing init failed: {message}")]
pub struct TelemetryError {
    message: String,
}

/// Install a JSON subscriber honouring `RUST_LOG`.
///
/// Fails when a global subscriber is already set.
pub fn init_tracing() -> Result<(), TelemetryError> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
        .map_err(|err| TelemetryError {
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn second_initialisation_is_reported() {
        let _ = init_tracing();
        let err = init_tracing().expect_err("subscriber already installed");
        assert!(err.to_string().starts_with("tracing init failed"));
    }
}
