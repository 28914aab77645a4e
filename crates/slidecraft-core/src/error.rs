//! Error types for gesture handling and engine configuration.

use thiserror::Error;

/// Reasons a gesture could not be started.
///
/// None of these are fatal: the engine stays idle and the pointer-down
/// simply has no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("Container measurement unavailable")]
    MissingContainer,
    #[error("Gesture already active on element: {0}")]
    AlreadyDragging(String),
    #[error("Element not found on slide: {0}")]
    UnknownElement(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
