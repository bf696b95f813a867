//! Error types for the trajectory controller.

use loco_nn::NetworkError;
use loco_types::LocoError;
use thiserror::Error;

/// Errors raised while driving a character.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    /// Invalid data or a diverged state.
    #[error(transparent)]
    Locomotion(#[from] LocoError),

    /// The network forward pass failed.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The engine's layer sizes do not fit the trajectory configuration.
    #[error(
        "network layout mismatch: trajectory needs {expected_input} inputs and {expected_output} outputs, engine has {input} and {output}"
    )]
    LayoutMismatch {
        /// Inputs required by the trajectory configuration.
        expected_input: usize,
        /// Outputs required by the trajectory configuration.
        expected_output: usize,
        /// Engine input size.
        input: usize,
        /// Engine output size.
        output: usize,
    },
}

impl ControllerError {
    /// Whether this error reports a non-finite controller state.
    #[must_use]
    pub fn is_diverged(&self) -> bool {
        matches!(self, Self::Locomotion(e) if e.is_diverged())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        let err: ControllerError = LocoError::diverged("phase is NaN").into();
        assert!(err.is_diverged());
        assert!(err.to_string().contains("phase is NaN"));

        let err: ControllerError = NetworkError::InvalidPhase(f32::NAN).into();
        assert!(matches!(err, ControllerError::Network(_)));
        assert!(!err.is_diverged());
    }

    #[test]
    fn test_layout_mismatch_display() {
        let err = ControllerError::LayoutMismatch {
            expected_input: 342,
            expected_output: 311,
            input: 300,
            output: 311,
        };
        let msg = err.to_string();
        assert!(msg.contains("342"));
        assert!(msg.contains("300"));
    }
}
