//! Error types for fluidbox.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("grid resolution must be positive, got {cells_x}x{cells_y}")]
    InvalidResolution { cells_x: usize, cells_y: usize },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("wall thickness {wall} leaves no interior in a {width}x{height} domain")]
    WallTooThick { wall: f64, width: f64, height: f64 },

    #[error("particle mass must be positive to convert force to acceleration, got {0}")]
    InvalidMass(f64),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Reject zero, negative, NaN and infinite values.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::NonPositive { name, value })
    }
}

/// Reject NaN and infinite values; sign is left to the caller.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::NonFinite { name, value })
    }
}
