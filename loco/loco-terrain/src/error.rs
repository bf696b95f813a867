//! Error types for terrain construction.

use thiserror::Error;

/// Errors raised while building terrain geometry.
///
/// Queries never fail; they answer `None` when nothing is hit.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TerrainError {
    /// Height field grid dimensions do not match the supplied samples.
    #[error("height field of {width}x{depth} needs {expected} samples, got {actual}")]
    DimensionMismatch {
        /// Samples along X.
        width: usize,
        /// Samples along Z.
        depth: usize,
        /// `width * depth`.
        expected: usize,
        /// Number of samples supplied.
        actual: usize,
    },

    /// A height field needs at least two samples along each axis.
    #[error("height field needs at least 2x2 samples, got {width}x{depth}")]
    TooSmall {
        /// Samples along X.
        width: usize,
        /// Samples along Z.
        depth: usize,
    },

    /// Cell size is not a positive finite number.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    /// A sample or bound is NaN or infinite.
    #[error("non-finite value in {what}")]
    NonFinite {
        /// What carried the value.
        what: &'static str,
    },

    /// Box obstacle with a minimum corner above its maximum corner.
    #[error("box obstacle is inverted on axis {axis}")]
    InvertedBox {
        /// 0 = X, 1 = Y, 2 = Z.
        axis: usize,
    },
}

impl TerrainError {
    /// Create a non-finite error.
    #[must_use]
    pub fn non_finite(what: &'static str) -> Self {
        Self::NonFinite { what }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TerrainError::DimensionMismatch {
            width: 3,
            depth: 2,
            expected: 6,
            actual: 5,
        };
        assert!(err.to_string().contains("3x2"));
        assert!(err.to_string().contains("got 5"));

        let err = TerrainError::non_finite("heights");
        assert_eq!(err.to_string(), "non-finite value in heights");
    }
}
