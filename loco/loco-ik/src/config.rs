//! Per-foot configuration.

use std::f32::consts::PI;

use loco_types::JointId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{IkError, Result};

/// Which joints make up a foot and how it meets the ground.
///
/// Heights are in scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FootConfig {
    /// Toe joint.
    pub toe: JointId,
    /// Ankle joint, the one whose pose is corrected.
    pub ankle: JointId,
    /// Height of the heel above the toes.
    pub heel_height: f32,
    /// Height of the toes above the ground (half the toe thickness).
    pub toe_offset: f32,
    /// Phase at which the foot is lifted off the ground.
    pub target_phase: f32,
    /// Lower bound on the heel height when telling steep from gradual slopes.
    pub min_comparison_height: f32,
    /// Height above each joint the ground probes start from.
    pub probe_height: f32,
    /// Maximum length of the ground probes.
    pub probe_distance: f32,
}

impl FootConfig {
    /// Foot made of the given toe and ankle joints.
    #[must_use]
    pub fn new(toe: JointId, ankle: JointId) -> Self {
        Self {
            toe,
            ankle,
            heel_height: 0.0,
            toe_offset: 0.0,
            target_phase: PI,
            min_comparison_height: 0.1,
            probe_height: 1.0,
            probe_distance: 100.0,
        }
    }

    /// The left foot.
    #[must_use]
    pub fn left() -> Self {
        Self::new(JointId::LeftToeBase, JointId::LeftFoot)
    }

    /// The right foot.
    #[must_use]
    pub fn right() -> Self {
        Self::new(JointId::RightToeBase, JointId::RightFoot)
    }

    /// Set the heel height.
    #[must_use]
    pub fn heel_height(mut self, height: f32) -> Self {
        self.heel_height = height;
        self
    }

    /// Set the toe offset.
    #[must_use]
    pub fn toe_offset(mut self, offset: f32) -> Self {
        self.toe_offset = offset;
        self
    }

    /// Set the lift-off phase.
    #[must_use]
    pub fn target_phase(mut self, phase: f32) -> Self {
        self.target_phase = phase;
        self
    }

    /// Heel height used for the slope test.
    #[must_use]
    pub fn comparison_height(&self) -> f32 {
        self.heel_height.max(self.min_comparison_height)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.toe == self.ankle {
            return Err(IkError::invalid_config(format!(
                "toe and ankle must be different joints, both are {:?}",
                self.toe
            )));
        }
        let finite = [
            ("heel_height", self.heel_height),
            ("toe_offset", self.toe_offset),
            ("target_phase", self.target_phase),
            ("min_comparison_height", self.min_comparison_height),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(IkError::invalid_config(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("probe_height", self.probe_height),
            ("probe_distance", self.probe_distance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(IkError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}
