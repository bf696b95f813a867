//! Trained network parameters and their on-disk layout.
//!
//! A model directory holds little-endian `f32` blobs in row-major order:
//!
//! | File | Shape |
//! |------|-------|
//! | `Xmean.bin`, `Xstd.bin` | `input x 1` |
//! | `Ymean.bin`, `Ystd.bin` | `output x 1` |
//! | `W0_{i:03}.bin` | `hidden x input` |
//! | `W1_{i:03}.bin` | `hidden x hidden` |
//! | `W2_{i:03}.bin` | `output x hidden` |
//! | `b0_{i:03}.bin`, `b1_{i:03}.bin` | `hidden x 1` |
//! | `b2_{i:03}.bin` | `output x 1` |
//!
//! File sizes are checked against the configured shapes before reading.
//! The normalization vectors are required. A missing per-expert file is
//! handled according to [`MissingWeightPolicy`].

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{DenseMatrix, MissingWeightPolicy, NetworkConfig, NetworkError, Result};

/// Input and output normalization statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    /// Input mean.
    pub x_mean: DenseMatrix,
    /// Input standard deviation.
    pub x_std: DenseMatrix,
    /// Output mean.
    pub y_mean: DenseMatrix,
    /// Output standard deviation.
    pub y_std: DenseMatrix,
}

impl Normalization {
    /// Identity normalization: zero mean, unit deviation.
    #[must_use]
    pub fn identity(config: &NetworkConfig) -> Self {
        Self {
            x_mean: DenseMatrix::vector(config.input_size),
            x_std: DenseMatrix::filled(config.input_size, 1, 1.0),
            y_mean: DenseMatrix::vector(config.output_size),
            y_std: DenseMatrix::filled(config.output_size, 1, 1.0),
        }
    }

    fn check_shapes(&self, config: &NetworkConfig) -> Result<()> {
        check_shape("Xmean", &self.x_mean, (config.input_size, 1))?;
        check_shape("Xstd", &self.x_std, (config.input_size, 1))?;
        check_shape("Ymean", &self.y_mean, (config.output_size, 1))?;
        check_shape("Ystd", &self.y_std, (config.output_size, 1))
    }
}

/// Weights and biases of one expert.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpertParameters {
    /// Input to first hidden layer, `hidden x input`.
    pub w0: DenseMatrix,
    /// First to second hidden layer, `hidden x hidden`.
    pub w1: DenseMatrix,
    /// Second hidden layer to output, `output x hidden`.
    pub w2: DenseMatrix,
    /// First hidden bias.
    pub b0: DenseMatrix,
    /// Second hidden bias.
    pub b1: DenseMatrix,
    /// Output bias.
    pub b2: DenseMatrix,
}

impl ExpertParameters {
    /// Zero-initialized expert.
    #[must_use]
    pub fn zeros(config: &NetworkConfig) -> Self {
        let (i, o, h) = (config.input_size, config.output_size, config.hidden_size);
        Self {
            w0: DenseMatrix::zeros(h, i),
            w1: DenseMatrix::zeros(h, h),
            w2: DenseMatrix::zeros(o, h),
            b0: DenseMatrix::vector(h),
            b1: DenseMatrix::vector(h),
            b2: DenseMatrix::vector(o),
        }
    }

    /// Check every matrix against the configured shapes.
    pub fn check_shapes(&self, config: &NetworkConfig) -> Result<()> {
        let (i, o, h) = (config.input_size, config.output_size, config.hidden_size);
        check_shape("W0", &self.w0, (h, i))?;
        check_shape("W1", &self.w1, (h, h))?;
        check_shape("W2", &self.w2, (o, h))?;
        check_shape("b0", &self.b0, (h, 1))?;
        check_shape("b1", &self.b1, (h, 1))?;
        check_shape("b2", &self.b2, (o, 1))
    }

    /// Overwrite with the linear blend of two experts.
    pub fn set_linear(&mut self, a: &Self, b: &Self, mu: f32) -> Result<()> {
        self.w0.set_linear(&a.w0, &b.w0, mu)?;
        self.w1.set_linear(&a.w1, &b.w1, mu)?;
        self.w2.set_linear(&a.w2, &b.w2, mu)?;
        self.b0.set_linear(&a.b0, &b.b0, mu)?;
        self.b1.set_linear(&a.b1, &b.b1, mu)?;
        self.b2.set_linear(&a.b2, &b.b2, mu)
    }

    /// Overwrite with the Catmull-Rom blend of four experts.
    pub fn set_cubic(&mut self, e: [&Self; 4], mu: f32) -> Result<()> {
        let [a, b, c, d] = e;
        self.w0.set_cubic(&a.w0, &b.w0, &c.w0, &d.w0, mu)?;
        self.w1.set_cubic(&a.w1, &b.w1, &c.w1, &d.w1, mu)?;
        self.w2.set_cubic(&a.w2, &b.w2, &c.w2, &d.w2, mu)?;
        self.b0.set_cubic(&a.b0, &b.b0, &c.b0, &d.b0, mu)?;
        self.b1.set_cubic(&a.b1, &b.b1, &c.b1, &d.b1, mu)?;
        self.b2.set_cubic(&a.b2, &b.b2, &c.b2, &d.b2, mu)
    }
}

/// A per-expert weight file that was absent and left zeroed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialModelWarning {
    /// Path of the absent file.
    pub path: PathBuf,
    /// Expert bucket that uses the file.
    pub bucket: usize,
}

impl fmt::Display for PartialModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weight file {} is missing; expert {} uses zeros in its place",
            self.path.display(),
            self.bucket
        )
    }
}

/// Full parameter set of a phase-functioned network.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    /// Normalization statistics.
    pub normalization: Normalization,
    /// One parameter set per expert bucket.
    pub experts: Vec<ExpertParameters>,
    /// Files that were absent during loading.
    pub warnings: Vec<PartialModelWarning>,
}

impl ModelParameters {
    /// Zero experts with identity normalization.
    #[must_use]
    pub fn zeros(config: &NetworkConfig) -> Self {
        Self {
            normalization: Normalization::identity(config),
            experts: (0..config.bucket_count())
                .map(|_| ExpertParameters::zeros(config))
                .collect(),
            warnings: Vec::new(),
        }
    }

    /// Load parameters from a model directory.
    pub fn load(dir: impl AsRef<Path>, config: &NetworkConfig) -> Result<Self> {
        config.validate()?;
        let dir = dir.as_ref();
        let (i, o, h) = (config.input_size, config.output_size, config.hidden_size);

        let normalization = Normalization {
            x_mean: read_required(&dir.join("Xmean.bin"), i, 1)?,
            x_std: read_required(&dir.join("Xstd.bin"), i, 1)?,
            y_mean: read_required(&dir.join("Ymean.bin"), o, 1)?,
            y_std: read_required(&dir.join("Ystd.bin"), o, 1)?,
        };

        let mut warnings = Vec::new();
        let mut experts = Vec::with_capacity(config.bucket_count());
        for bucket in 0..config.bucket_count() {
            let file = config.mode.file_index(bucket);
            let mut read = |prefix: &str, rows: usize, cols: usize| {
                let path = dir.join(expert_file_name(prefix, file));
                read_expert(path, rows, cols, bucket, config.missing_weights, &mut warnings)
            };
            experts.push(ExpertParameters {
                w0: read("W0", h, i)?,
                w1: read("W1", h, h)?,
                w2: read("W2", o, h)?,
                b0: read("b0", h, 1)?,
                b1: read("b1", h, 1)?,
                b2: read("b2", o, 1)?,
            });
        }

        info!(
            dir = %dir.display(),
            mode = ?config.mode,
            buckets = experts.len(),
            input = i,
            output = o,
            hidden = h,
            missing = warnings.len(),
            "loaded locomotion network"
        );

        Ok(Self {
            normalization,
            experts,
            warnings,
        })
    }

    /// Write every parameter into `dir` using the on-disk layout.
    pub fn save(&self, dir: impl AsRef<Path>, config: &NetworkConfig) -> Result<()> {
        self.validate(config)?;
        let dir = dir.as_ref();
        let norm = &self.normalization;
        write_matrix(&dir.join("Xmean.bin"), &norm.x_mean)?;
        write_matrix(&dir.join("Xstd.bin"), &norm.x_std)?;
        write_matrix(&dir.join("Ymean.bin"), &norm.y_mean)?;
        write_matrix(&dir.join("Ystd.bin"), &norm.y_std)?;

        for (bucket, expert) in self.experts.iter().enumerate() {
            let file = config.mode.file_index(bucket);
            let files = [
                ("W0", &expert.w0),
                ("W1", &expert.w1),
                ("W2", &expert.w2),
                ("b0", &expert.b0),
                ("b1", &expert.b1),
                ("b2", &expert.b2),
            ];
            for (prefix, matrix) in files {
                write_matrix(&dir.join(expert_file_name(prefix, file)), matrix)?;
            }
        }
        Ok(())
    }

    /// Check the parameter set against a configuration.
    pub fn validate(&self, config: &NetworkConfig) -> Result<()> {
        config.validate()?;
        if self.experts.len() != config.bucket_count() {
            return Err(NetworkError::invalid_config(format!(
                "{:?} mode needs {} experts, got {}",
                config.mode,
                config.bucket_count(),
                self.experts.len()
            )));
        }
        self.normalization.check_shapes(config)?;
        for expert in &self.experts {
            expert.check_shapes(config)?;
        }
        Ok(())
    }

    /// Whether any per-expert file was missing during loading.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// File name of an expert parameter, e.g. `W1_007.bin`.
#[must_use]
pub fn expert_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index:03}.bin")
}

/// Write a matrix as little-endian `f32` in row-major order.
pub fn write_matrix(path: &Path, matrix: &DenseMatrix) -> Result<()> {
    let bytes: Vec<u8> = matrix
        .as_slice()
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    fs::write(path, bytes).map_err(|source| NetworkError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a `rows x cols` matrix, or `None` if the file does not exist.
pub fn read_matrix(path: &Path, rows: usize, cols: usize) -> Result<Option<DenseMatrix>> {
    let io_err = |source| NetworkError::Io {
        path: path.to_path_buf(),
        source,
    };

    let actual_bytes = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(e)),
    };
    let expected_bytes = (rows * cols * std::mem::size_of::<f32>()) as u64;
    if actual_bytes != expected_bytes {
        return Err(NetworkError::WeightShapeMismatch {
            path: path.to_path_buf(),
            rows,
            cols,
            expected_bytes,
            actual_bytes,
        });
    }

    let bytes = fs::read(path).map_err(io_err)?;
    let data = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    DenseMatrix::from_vec(rows, cols, data).map(Some)
}

fn read_required(path: &Path, rows: usize, cols: usize) -> Result<DenseMatrix> {
    read_matrix(path, rows, cols)?.ok_or_else(|| NetworkError::MissingWeightFile {
        path: path.to_path_buf(),
    })
}

fn read_expert(
    path: PathBuf,
    rows: usize,
    cols: usize,
    bucket: usize,
    policy: MissingWeightPolicy,
    warnings: &mut Vec<PartialModelWarning>,
) -> Result<DenseMatrix> {
    if let Some(matrix) = read_matrix(&path, rows, cols)? {
        return Ok(matrix);
    }
    match policy {
        MissingWeightPolicy::Error => Err(NetworkError::MissingWeightFile { path }),
        MissingWeightPolicy::Warn => {
            let warning = PartialModelWarning { path, bucket };
            warn!("{warning}");
            warnings.push(warning);
            Ok(DenseMatrix::zeros(rows, cols))
        }
    }
}

fn check_shape(name: &'static str, matrix: &DenseMatrix, expected: (usize, usize)) -> Result<()> {
    if matrix.shape() == expected {
        Ok(())
    } else {
        Err(NetworkError::dimension_mismatch(name, expected, matrix.shape()))
    }
}
