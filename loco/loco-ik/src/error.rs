//! Error types for foot placement.

use thiserror::Error;

use crate::FootHandle;

/// Errors raised by foot placement.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum IkError {
    /// Invalid foot configuration.
    #[error("invalid foot configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// The foot is not registered (never was, or was unregistered).
    #[error("unknown foot handle {0:?}")]
    UnknownFoot(FootHandle),
}

impl IkError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
