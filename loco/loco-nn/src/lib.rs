//! Phase-functioned neural network inference.
//!
//! This crate evaluates the locomotion network: a three-layer ELU network
//! whose weights are selected (or blended) by the gait phase.
//!
//! - [`DenseMatrix`] - Row-major `f32` matrix with shape-checked operators
//! - [`ModelParameters`] - Experts and normalization statistics, with the
//!   on-disk loader
//! - [`InferenceEngine`] - Immutable, shareable forward pass
//! - [`NetworkScratch`] - Per-character input/output and hidden buffers
//! - [`NetworkConfig`] - Layer sizes, interpolation mode, missing-file policy
//!
//! # Forward Pass
//!
//! ```text
//! X  <- (X - Xmean) / Xstd
//! H0 <- ELU(W0[p] X  + b0[p])
//! H1 <- ELU(W1[p] H0 + b1[p])
//! Y  <- (W2[p] H1 + b2[p]) * Ystd + Ymean
//! ```
//!
//! where `[p]` is the expert for phase `p`: the nearest of 50 in
//! [`InterpolationMode::Constant`], a linear blend of 10 in
//! [`InterpolationMode::Linear`], or a Catmull-Rom blend of 4 in
//! [`InterpolationMode::Cubic`].
//!
//! # Missing Files
//!
//! Normalization files are required. A missing per-expert file is replaced
//! by zeros and reported as a [`PartialModelWarning`], available from
//! [`InferenceEngine::warnings`] and logged through `tracing`. Configure
//! [`MissingWeightPolicy::Error`] to fail instead.
//!
//! # Example
//!
//! ```
//! use loco_nn::{InferenceEngine, NetworkConfig};
//!
//! let engine = InferenceEngine::zeros(NetworkConfig::with_sizes(8, 4, 16)).unwrap();
//! let mut scratch = engine.scratch();
//! scratch.x.fill(1.0);
//! engine.compute(&mut scratch, 1.0).unwrap();
//! assert_eq!(scratch.y.len(), 4);
//! ```
//!
//! # Layer 0 Crate
//!
//! This crate has no Bevy or GPU dependencies and performs all arithmetic in
//! single precision on the CPU.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod config;
mod engine;
mod error;
mod matrix;
mod weights;

pub use config::{InterpolationMode, MissingWeightPolicy, NetworkConfig};
pub use engine::{InferenceEngine, NetworkScratch, bucket_index};
pub use error::NetworkError;
pub use matrix::DenseMatrix;
pub use weights::{
    ExpertParameters, ModelParameters, Normalization, PartialModelWarning, expert_file_name,
    read_matrix, write_matrix,
};

/// Result type for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
