//! Error types for locomotion data.

use thiserror::Error;

/// Errors raised by locomotion data types.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LocoError {
    /// Joint index outside the fixed skeleton.
    #[error("invalid joint index: {index} (skeleton has {count} joints)")]
    InvalidJointIndex {
        /// The offending index.
        index: usize,
        /// Number of joints in the skeleton.
        count: usize,
    },

    /// Wall segment whose endpoints coincide.
    #[error("degenerate wall segment at ({x}, {z}): start and end coincide")]
    DegenerateWallSegment {
        /// X coordinate of the collapsed segment.
        x: f32,
        /// Z coordinate of the collapsed segment.
        z: f32,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Character state became non-finite.
    #[error("locomotion diverged: {reason}")]
    Diverged {
        /// Description of what went wrong.
        reason: String,
    },
}

impl LocoError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a diverged error.
    #[must_use]
    pub fn diverged(reason: impl Into<String>) -> Self {
        Self::Diverged {
            reason: reason.into(),
        }
    }

    /// Check if this is a divergence error.
    #[must_use]
    pub fn is_diverged(&self) -> bool {
        matches!(self, Self::Diverged { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LocoError::InvalidJointIndex {
            index: 42,
            count: 31,
        };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("31"));

        let err = LocoError::DegenerateWallSegment { x: 1.5, z: -2.0 };
        assert!(err.to_string().contains("1.5"));

        let err = LocoError::diverged("NaN phase");
        assert!(err.to_string().contains("NaN"));
    }

    #[test]
    fn test_error_predicates() {
        let err = LocoError::diverged("test");
        assert!(err.is_diverged());
        assert!(!err.is_config_error());

        let err = LocoError::invalid_config("bad value");
        assert!(err.is_config_error());
        assert!(!err.is_diverged());
    }
}
