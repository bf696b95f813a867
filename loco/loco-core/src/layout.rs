//! Input and output vector layout of the locomotion network.
//!
//! With `w` trajectory samples (every tenth point of the window):
//!
//! ```text
//! input   [0, 4w)              trajectory pos X, pos Z, dir X, dir Z
//!         [4w, 10w)            gaits stand, walk, jog, crouch, jump, (zero)
//!         [10w, 10w + 93)      joint positions, previous root frame
//!         [10w + 93, 10w + 186) joint velocities, previous root frame
//!         [10w + 186, 13w + 186) heights right, center, left
//!
//! output  0 root dX, 1 root dZ, 2 heading delta, 3 phase delta, 4..8 unused
//!         [8, 8 + 2w)          future samples pos X, pos Z, dir X, dir Z (w/2 each)
//!         then joint positions, velocities, rotations (93 each)
//! ```

use loco_nn::InferenceEngine;
use loco_types::{JOINT_COUNT, LocomotionConfig};

use crate::{ControllerError, Result};

/// Floats per joint block (xyz per joint).
const JOINT_BLOCK: usize = JOINT_COUNT * 3;

/// Leading output slots before the future trajectory.
const OUTPUT_HEADER: usize = 8;

/// Offsets into the network input and output vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkLayout {
    samples: usize,
}

impl NetworkLayout {
    /// Layout for a window with `samples` encoded points.
    #[must_use]
    pub const fn new(samples: usize) -> Self {
        Self { samples }
    }

    /// Layout matching a locomotion configuration.
    #[must_use]
    pub const fn from_config(config: &LocomotionConfig) -> Self {
        Self::new(config.trajectory_projections)
    }

    /// Encoded trajectory samples `w`.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Predicted future samples in the output (`w / 2`).
    #[must_use]
    pub const fn future_samples(&self) -> usize {
        self.samples / 2
    }

    /// Input vector length.
    #[must_use]
    pub const fn input_size(&self) -> usize {
        13 * self.samples + 2 * JOINT_BLOCK
    }

    /// Output vector length.
    #[must_use]
    pub const fn output_size(&self) -> usize {
        OUTPUT_HEADER + 4 * self.future_samples() + 3 * JOINT_BLOCK
    }

    /// Start of trajectory channel `channel` (0 pos X, 1 pos Z, 2 dir X, 3 dir Z).
    #[must_use]
    pub const fn trajectory(&self, channel: usize) -> usize {
        channel * self.samples
    }

    /// Start of gait channel `channel` (0 stand .. 4 jump, 5 unused).
    #[must_use]
    pub const fn gait(&self, channel: usize) -> usize {
        (4 + channel) * self.samples
    }

    /// Start of the joint position block in the input.
    #[must_use]
    pub const fn input_joint_positions(&self) -> usize {
        10 * self.samples
    }

    /// Start of the joint velocity block in the input.
    #[must_use]
    pub const fn input_joint_velocities(&self) -> usize {
        self.input_joint_positions() + JOINT_BLOCK
    }

    /// Start of height channel `channel` (0 right, 1 center, 2 left).
    #[must_use]
    pub const fn height(&self, channel: usize) -> usize {
        self.input_joint_velocities() + JOINT_BLOCK + channel * self.samples
    }

    /// Start of future channel `channel` in the output.
    #[must_use]
    pub const fn future(&self, channel: usize) -> usize {
        OUTPUT_HEADER + channel * self.future_samples()
    }

    /// Start of the decoded joint positions.
    #[must_use]
    pub const fn output_joint_positions(&self) -> usize {
        OUTPUT_HEADER + 4 * self.future_samples()
    }

    /// Start of the decoded joint velocities.
    #[must_use]
    pub const fn output_joint_velocities(&self) -> usize {
        self.output_joint_positions() + JOINT_BLOCK
    }

    /// Start of the decoded joint rotations (exponential map).
    #[must_use]
    pub const fn output_joint_rotations(&self) -> usize {
        self.output_joint_velocities() + JOINT_BLOCK
    }

    /// Verify that an engine's layer sizes fit this layout.
    pub fn check(&self, engine: &InferenceEngine) -> Result<()> {
        if engine.input_size() != self.input_size() || engine.output_size() != self.output_size()
        {
            return Err(ControllerError::LayoutMismatch {
                expected_input: self.input_size(),
                expected_output: self.output_size(),
                input: engine.input_size(),
                output: engine.output_size(),
            });
        }
        Ok(())
    }
}
