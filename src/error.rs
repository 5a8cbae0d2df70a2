//! Error types for cyclesense

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Empty input and an unconfigured cycle are ordinary states with sentinel
/// results, not errors; this enum covers genuinely invalid input only.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid cycle configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
