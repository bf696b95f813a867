//! Network configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{NetworkError, Result};

/// How expert parameters are selected from the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InterpolationMode {
    /// Nearest of 50 experts.
    #[default]
    Constant,
    /// Linear blend between neighbours of 10 experts.
    Linear,
    /// Catmull-Rom blend over 4 experts.
    Cubic,
}

impl InterpolationMode {
    /// Number of expert buckets for this mode.
    #[must_use]
    pub const fn bucket_count(self) -> usize {
        match self {
            Self::Constant => 50,
            Self::Linear => 10,
            Self::Cubic => 4,
        }
    }

    /// Index of the weight file backing bucket `i`.
    ///
    /// Linear and cubic modes reuse a subset of the 50 trained experts.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn file_index(self, bucket: usize) -> usize {
        match self {
            Self::Constant => bucket,
            Self::Linear => bucket * 5,
            Self::Cubic => (bucket as f32 * 12.5) as usize,
        }
    }
}

/// What to do when a per-expert weight file is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MissingWeightPolicy {
    /// Leave the parameter zeroed and record a [`PartialModelWarning`].
    ///
    /// [`PartialModelWarning`]: crate::PartialModelWarning
    #[default]
    Warn,
    /// Fail the load with [`NetworkError::MissingWeightFile`].
    Error,
}

/// Network shape and loading behaviour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkConfig {
    /// Input vector length.
    pub input_size: usize,
    /// Output vector length.
    pub output_size: usize,
    /// Hidden layer width.
    pub hidden_size: usize,
    /// Expert selection mode.
    pub mode: InterpolationMode,
    /// Handling of absent per-expert files.
    pub missing_weights: MissingWeightPolicy,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            input_size: 342,
            output_size: 311,
            hidden_size: 512,
            mode: InterpolationMode::Constant,
            missing_weights: MissingWeightPolicy::Warn,
        }
    }
}

impl NetworkConfig {
    /// Config with explicit layer sizes and default loading behaviour.
    #[must_use]
    pub fn with_sizes(input_size: usize, output_size: usize, hidden_size: usize) -> Self {
        Self {
            input_size,
            output_size,
            hidden_size,
            ..Default::default()
        }
    }

    /// Set the interpolation mode.
    #[must_use]
    pub fn mode(mut self, mode: InterpolationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the missing weight policy.
    #[must_use]
    pub fn missing_weights(mut self, policy: MissingWeightPolicy) -> Self {
        self.missing_weights = policy;
        self
    }

    /// Number of expert buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.mode.bucket_count()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 || self.output_size == 0 || self.hidden_size == 0 {
            return Err(NetworkError::invalid_config(format!(
                "layer sizes must be positive, got input={} output={} hidden={}",
                self.input_size, self.output_size, self.hidden_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_counts() {
        assert_eq!(InterpolationMode::Constant.bucket_count(), 50);
        assert_eq!(InterpolationMode::Linear.bucket_count(), 10);
        assert_eq!(InterpolationMode::Cubic.bucket_count(), 4);
    }

    #[test]
    fn test_file_indices() {
        assert_eq!(InterpolationMode::Constant.file_index(17), 17);
        let linear: Vec<_> = (0..10).map(|i| InterpolationMode::Linear.file_index(i)).collect();
        assert_eq!(linear, vec![0, 5, 10, 15, 20, 25, 30, 35, 40, 45]);
        let cubic: Vec<_> = (0..4).map(|i| InterpolationMode::Cubic.file_index(i)).collect();
        assert_eq!(cubic, vec![0, 12, 25, 37]);
    }

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.input_size, 342);
        assert_eq!(config.output_size, 311);
        assert_eq!(config.hidden_size, 512);
        assert_eq!(config.bucket_count(), 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_sizes() {
        let err = NetworkConfig::with_sizes(0, 3, 4).validate().unwrap_err();
        assert!(err.to_string().contains("input=0"));
    }
}
