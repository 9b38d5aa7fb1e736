//! Structured logging setup.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

/// Failure installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed in this process.
    #[error("tracing subscriber already initialised: {message}")]
    AlreadyInitialised { message: String },
}

/// Install a JSON formatter filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns [`TelemetryError::AlreadyInitialised`] when called more than once.
pub fn init_tracing() -> Result<(), TelemetryError> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInitialised {
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_reported() {
        // Another test may have installed a subscriber first, so only the
        // second call is asserted.
        let _ = init_tracing();
        assert!(matches!(
            init_tracing(),
            Err(TelemetryError::AlreadyInitialised { .. })
        ));
    }
}
