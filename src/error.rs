//! Error types for network construction, inference and training.

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Precondition violations raised synchronously by the offending call.
///
/// None of these are recovered from inside the engine; the caller has to fix
/// its inputs and retry.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("cannot create a network with {count} layer(s); at least 2 are required")]
    TooFewLayers { count: usize },

    #[error("layer {index} has no neurons")]
    EmptyLayer { index: usize },

    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("batch size {batch_size} is outside [1, {examples}]")]
    InvalidBatchSize { batch_size: i64, examples: usize },

    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    /// A raw training example must be exactly an (inputs, expected) pair.
    #[error("training example has {parts} part(s), expected 2")]
    MalformedExample { parts: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetworkError {
    pub(crate) fn inputs(expected: usize, actual: usize) -> Self {
        NetworkError::DimensionMismatch { what: "inputs", expected, actual }
    }

    pub(crate) fn expected_outputs(expected: usize, actual: usize) -> Self {
        NetworkError::DimensionMismatch { what: "expected outputs", expected, actual }
    }
}
