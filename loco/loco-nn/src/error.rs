//! Error types for loco-nn.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or evaluating a network.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetworkError {
    /// Matrix operands have incompatible shapes.
    #[error("dimension mismatch in {op}: {lhs_rows}x{lhs_cols} vs {rhs_rows}x{rhs_cols}")]
    DimensionMismatch {
        /// Operation that failed.
        op: &'static str,
        /// Rows of the left operand.
        lhs_rows: usize,
        /// Columns of the left operand.
        lhs_cols: usize,
        /// Rows of the right operand.
        rhs_rows: usize,
        /// Columns of the right operand.
        rhs_cols: usize,
    },

    /// A weight file is absent.
    #[error("missing weight file: {}", path.display())]
    MissingWeightFile {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A weight file does not hold the expected number of floats.
    #[error(
        "weight file {} has wrong shape: expected {rows}x{cols} ({expected_bytes} bytes), found {actual_bytes} bytes",
        path.display()
    )]
    WeightShapeMismatch {
        /// Offending file.
        path: PathBuf,
        /// Expected rows.
        rows: usize,
        /// Expected columns.
        cols: usize,
        /// Expected file size.
        expected_bytes: u64,
        /// Actual file size.
        actual_bytes: u64,
    },

    /// Phase outside `[0, 2π)` or not finite.
    #[error("invalid phase: {0} (must be finite and in [0, 2π))")]
    InvalidPhase(f32),

    /// Invalid network configuration.
    #[error("invalid network configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// IO error while reading weights.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl NetworkError {
    /// Create a dimension mismatch error from two shapes.
    #[must_use]
    pub fn dimension_mismatch(
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            op,
            lhs_rows: lhs.0,
            lhs_cols: lhs.1,
            rhs_rows: rhs.0,
            rhs_cols: rhs.1,
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a dimension mismatch.
    #[must_use]
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}
