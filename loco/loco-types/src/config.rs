//! Configuration for trajectory control.
//!
//! Defaults reproduce the parameters the locomotion networks were trained
//! with. Changing the trajectory length changes the network input and output
//! sizes, so it must match the loaded model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{LocoError, Result};

/// Exponential smoothing factors for controller inputs.
///
/// Each value is the fraction of the remaining distance to the target that a
/// signal covers per frame: `value += (target - value) * factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmoothingConfig {
    /// Facing direction smoothing.
    pub direction: f32,
    /// Target velocity smoothing.
    pub velocity: f32,
    /// Strafe amount smoothing.
    pub strafe: f32,
    /// Crouch amount smoothing.
    pub crouch: f32,
    /// Gait weight smoothing.
    pub gait: f32,
    /// Blend between extrapolated and decoded joint positions.
    pub joint: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            direction: 0.9,
            velocity: 0.9,
            strafe: 0.9,
            crouch: 0.9,
            gait: 0.1,
            joint: 0.5,
        }
    }
}

impl SmoothingConfig {
    /// Validate that every factor is in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let factors = [
            ("direction", self.direction),
            ("velocity", self.velocity),
            ("strafe", self.strafe),
            ("crouch", self.crouch),
            ("gait", self.gait),
            ("joint", self.joint),
        ];
        for (name, value) in factors {
            if !(0.0..=1.0).contains(&value) {
                return Err(LocoError::invalid_config(format!(
                    "{name} smoothing must be in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Trajectory controller configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocomotionConfig {
    /// Number of sampled trajectory points fed to the network. The window
    /// holds ten sub-steps per projection.
    pub trajectory_projections: usize,
    /// Scene units per network unit.
    pub scale_factor: f32,
    /// Lateral offset (network units) of the side height probes.
    pub side_points_offset: f32,
    /// Distance (scene units) the trajectory is kept away from walls.
    pub wall_width: f32,
    /// Width (scene units) of the soft zone beyond `wall_width`.
    pub wall_val: f32,
    /// Maximum forward shadow (scene units) between the hip and foot rays
    /// for a slope to count as a wall.
    pub auto_wall_shadow_length: f32,
    /// Seconds without detection before the automatic wall is removed.
    pub auto_wall_clear_delay: f32,
    /// Seconds between network evaluations while moving.
    pub tick_interval: f32,
    /// Maximum network evaluations per frame.
    pub max_ticks_per_frame: u32,
    /// Movement speed without sprint (network units per tick).
    pub walk_speed: f32,
    /// Extra speed at full sprint.
    pub sprint_speed_bonus: f32,
    /// Stand weight above which the character counts as standing.
    pub standing_threshold: f32,
    /// Target speed below which the stand gait is selected.
    pub stand_velocity_threshold: f32,
    /// Input smoothing.
    pub smoothing: SmoothingConfig,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            trajectory_projections: 12,
            scale_factor: 0.04,
            side_points_offset: 25.0,
            wall_width: 1.5,
            wall_val: 1.1,
            auto_wall_shadow_length: 4.0,
            auto_wall_clear_delay: 0.1,
            tick_interval: 1.0 / 60.0,
            max_ticks_per_frame: 4,
            walk_speed: 2.5,
            sprint_speed_bonus: 2.5,
            standing_threshold: 0.9,
            stand_velocity_threshold: 0.1,
            smoothing: SmoothingConfig::default(),
        }
    }
}

impl LocomotionConfig {
    /// Set the scene scale factor.
    #[must_use]
    pub fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the wall clearance and soft zone widths.
    #[must_use]
    pub fn walls(mut self, wall_width: f32, wall_val: f32) -> Self {
        self.wall_width = wall_width;
        self.wall_val = wall_val;
        self
    }

    /// Set the per-frame network evaluation cap.
    #[must_use]
    pub fn max_ticks_per_frame(mut self, max_ticks: u32) -> Self {
        self.max_ticks_per_frame = max_ticks;
        self
    }

    /// Set the smoothing configuration.
    #[must_use]
    pub fn smoothing(mut self, smoothing: SmoothingConfig) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Number of samples in the trajectory window.
    #[must_use]
    pub fn trajectory_length(&self) -> usize {
        self.trajectory_projections * 10
    }

    /// Index of the "now" sample.
    #[must_use]
    pub fn center(&self) -> usize {
        self.trajectory_length() / 2
    }

    /// Network units per scene unit.
    #[must_use]
    pub fn inverse_scale(&self) -> f32 {
        1.0 / self.scale_factor
    }

    /// Movement speed for a sprint amount.
    #[must_use]
    pub fn movement_speed(&self, sprint: f32) -> f32 {
        self.walk_speed + self.sprint_speed_bonus * sprint
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.trajectory_projections < 2 || self.trajectory_projections % 2 != 0 {
            return Err(LocoError::invalid_config(format!(
                "trajectory_projections must be even and at least 2, got {}",
                self.trajectory_projections
            )));
        }
        let positive = [
            ("scale_factor", self.scale_factor),
            ("wall_val", self.wall_val),
            ("tick_interval", self.tick_interval),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LocoError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        let non_negative = [
            ("side_points_offset", self.side_points_offset),
            ("wall_width", self.wall_width),
            ("auto_wall_shadow_length", self.auto_wall_shadow_length),
            ("auto_wall_clear_delay", self.auto_wall_clear_delay),
            ("walk_speed", self.walk_speed),
            ("sprint_speed_bonus", self.sprint_speed_bonus),
            ("stand_velocity_threshold", self.stand_velocity_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(LocoError::invalid_config(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.standing_threshold) {
            return Err(LocoError::invalid_config(format!(
                "standing_threshold must be in [0, 1], got {}",
                self.standing_threshold
            )));
        }
        if self.max_ticks_per_frame == 0 {
            return Err(LocoError::invalid_config(
                "max_ticks_per_frame must be at least 1",
            ));
        }
        self.smoothing.validate()
    }
}
