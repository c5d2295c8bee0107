//! Error types for terrain sculpting and classification.

/// Errors raised by generators, erosion operators, and classification passes.
///
/// Every fallible pass validates its inputs before touching the grid, so an
/// `Err` never leaves a half-applied pass behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// Grid or source buffer has unusable dimensions.
    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        reason: &'static str,
    },

    /// A configuration value is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    /// An erosion variant name that does not match any known operator.
    #[error("unknown erosion variant: {0}")]
    InvalidVariant(String),

    /// The canyon carver needed a deeper worklist than allowed.
    #[error("canyon carve exceeded the depth limit of {limit}")]
    RecursionLimitExceeded { limit: usize },

    /// The caller requested early termination between passes.
    #[error("operation cancelled")]
    Cancelled,
}

impl TerrainError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Returns an error when `min > max` for a named bound pair.
pub(crate) fn check_range(name: &'static str, min: f32, max: f32) -> Result<(), TerrainError> {
    if min > max {
        return Err(TerrainError::invalid_parameter(
            name,
            format!("min ({min}) is greater than max ({max})"),
        ));
    }
    Ok(())
}
