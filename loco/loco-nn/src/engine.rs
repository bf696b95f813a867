//! Phase-indexed forward pass.
//!
//! [`InferenceEngine`] is immutable once built and can be shared between
//! characters through an `Arc`. Per-character buffers live in
//! [`NetworkScratch`], so one engine serves any number of controllers.

use std::f32::consts::TAU;
use std::path::Path;

use tracing::trace;

use crate::{
    DenseMatrix, ExpertParameters, InterpolationMode, ModelParameters, NetworkConfig,
    NetworkError, PartialModelWarning, Result,
};

/// Index of the expert bucket for `phase` among `buckets` buckets.
///
/// `phase` must be finite and in `[0, 2π)`.
pub fn bucket_index(phase: f32, buckets: usize) -> Result<usize> {
    let (index, _) = bucket_position(phase, buckets)?;
    Ok(index)
}

/// Bucket index and fractional position within it.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bucket_position(phase: f32, buckets: usize) -> Result<(usize, f32)> {
    if !phase.is_finite() || !(0.0..TAU).contains(&phase) {
        return Err(NetworkError::InvalidPhase(phase));
    }
    let scaled = phase / TAU * buckets as f32;
    let index = (scaled.floor() as usize).min(buckets.saturating_sub(1));
    let mu = (scaled - index as f32).clamp(0.0, 1.0);
    Ok((index, mu))
}

/// Per-character buffers for the forward pass.
#[derive(Debug, Clone)]
pub struct NetworkScratch {
    /// Network input. Filled by the caller before [`InferenceEngine::compute`].
    pub x: DenseMatrix,
    /// Network output, denormalized.
    pub y: DenseMatrix,
    h0: DenseMatrix,
    h1: DenseMatrix,
    blended: Option<Box<ExpertParameters>>,
}

/// Multi-expert network evaluated at a phase.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    config: NetworkConfig,
    params: ModelParameters,
}

impl InferenceEngine {
    /// Load an engine from a model directory.
    pub fn load(dir: impl AsRef<Path>, config: NetworkConfig) -> Result<Self> {
        let params = ModelParameters::load(dir, &config)?;
        Self::from_parameters(config, params)
    }

    /// Build an engine from in-memory parameters.
    pub fn from_parameters(config: NetworkConfig, params: ModelParameters) -> Result<Self> {
        params.validate(&config)?;
        Ok(Self { config, params })
    }

    /// Engine whose experts are all zero, with identity normalization.
    ///
    /// Its output is always `Ymean`, which is zero until changed.
    pub fn zeros(config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        let params = ModelParameters::zeros(&config);
        Self::from_parameters(config, params)
    }

    /// Network configuration.
    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Loaded parameters.
    #[must_use]
    pub fn parameters(&self) -> &ModelParameters {
        &self.params
    }

    /// Input vector length.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.config.input_size
    }

    /// Output vector length.
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.config.output_size
    }

    /// Files that were absent when the model was loaded.
    #[must_use]
    pub fn warnings(&self) -> &[PartialModelWarning] {
        &self.params.warnings
    }

    /// Allocate scratch buffers sized for this engine, with `y = Ymean`.
    #[must_use]
    pub fn scratch(&self) -> NetworkScratch {
        let c = &self.config;
        let blended = match c.mode {
            InterpolationMode::Constant => None,
            InterpolationMode::Linear | InterpolationMode::Cubic => {
                Some(Box::new(ExpertParameters::zeros(c)))
            }
        };
        NetworkScratch {
            x: DenseMatrix::vector(c.input_size),
            y: self.params.normalization.y_mean.clone(),
            h0: DenseMatrix::vector(c.hidden_size),
            h1: DenseMatrix::vector(c.hidden_size),
            blended,
        }
    }

    /// Set the output to the neutral pose `Ymean`.
    pub fn reset(&self, scratch: &mut NetworkScratch) -> Result<()> {
        scratch.y.copy_from(&self.params.normalization.y_mean)
    }

    /// Run the forward pass on `scratch.x` at `phase`, writing `scratch.y`.
    ///
    /// `scratch.x` is normalized in place.
    pub fn compute(&self, scratch: &mut NetworkScratch, phase: f32) -> Result<()> {
        let norm = &self.params.normalization;
        scratch.x.try_sub_assign(&norm.x_mean)?;
        scratch.x.try_div_assign(&norm.x_std)?;

        let buckets = self.params.experts.len();
        let (index, mu) = bucket_position(phase, buckets)?;

        let expert = match (self.config.mode, scratch.blended.as_deref_mut()) {
            (InterpolationMode::Linear, Some(blended)) => {
                let next = (index + 1) % buckets;
                blended.set_linear(&self.params.experts[index], &self.params.experts[next], mu)?;
                &*blended
            }
            (InterpolationMode::Cubic, Some(blended)) => {
                let e = &self.params.experts;
                let i0 = (index + buckets - 1) % buckets;
                let i2 = (index + 1) % buckets;
                let i3 = (index + 2) % buckets;
                blended.set_cubic([&e[i0], &e[index], &e[i2], &e[i3]], mu)?;
                &*blended
            }
            (InterpolationMode::Constant, _) => &self.params.experts[index],
            (mode, None) => {
                return Err(NetworkError::invalid_config(format!(
                    "scratch buffers were not created for {mode:?} mode"
                )));
            }
        };

        expert.w0.affine_into(&scratch.x, &expert.b0, &mut scratch.h0)?;
        scratch.h0.elu();
        expert.w1.affine_into(&scratch.h0, &expert.b1, &mut scratch.h1)?;
        scratch.h1.elu();
        expert.w2.affine_into(&scratch.h1, &expert.b2, &mut scratch.y)?;

        scratch.y.try_mul_elementwise_assign(&norm.y_std)?;
        scratch.y.try_add_assign(&norm.y_mean)?;

        trace!(phase, bucket = index, "network evaluated");
        Ok(())
    }
}
