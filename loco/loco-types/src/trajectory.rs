//! Trajectory window samples.

use nalgebra::{UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-sample gait weights.
///
/// Each channel lies in `[0, 1]` and is smoothed independently toward a
/// one-hot target, so the channels are not required to sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaitWeights {
    /// Standing still.
    pub stand: f32,
    /// Walking.
    pub walk: f32,
    /// Jogging.
    pub jog: f32,
    /// Crouched locomotion.
    pub crouch: f32,
    /// Jumping.
    pub jump: f32,
    /// Proximity to a wall.
    pub bump: f32,
}

impl GaitWeights {
    /// All channels zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            stand: 0.0,
            walk: 0.0,
            jog: 0.0,
            crouch: 0.0,
            jump: 0.0,
            bump: 0.0,
        }
    }

    /// Target weights for standing with the given amount.
    #[must_use]
    pub const fn standing(amount: f32) -> Self {
        Self {
            stand: amount,
            ..Self::zero()
        }
    }

    /// Target weights for walking.
    #[must_use]
    pub const fn walking() -> Self {
        Self {
            walk: 1.0,
            ..Self::zero()
        }
    }

    /// Target weights for jogging.
    #[must_use]
    pub const fn jogging() -> Self {
        Self {
            jog: 1.0,
            ..Self::zero()
        }
    }

    /// Target weights for crouching with the given amount.
    #[must_use]
    pub const fn crouching(amount: f32) -> Self {
        Self {
            crouch: amount,
            ..Self::zero()
        }
    }

    /// Move every channel a fraction `t` of the way toward `target`.
    ///
    /// A channel within [`GAIT_SNAP_EPSILON`] of its target lands on it
    /// exactly, so repeated smoothing converges instead of stalling a few
    /// ulps short.
    pub fn lerp_towards(&mut self, target: &Self, t: f32) {
        let t = t.clamp(0.0, 1.0);
        approach(&mut self.stand, target.stand, t);
        approach(&mut self.walk, target.walk, t);
        approach(&mut self.jog, target.jog, t);
        approach(&mut self.crouch, target.crouch, t);
        approach(&mut self.jump, target.jump, t);
        approach(&mut self.bump, target.bump, t);
    }
}

/// Distance below which [`GaitWeights::lerp_towards`] snaps to the target.
pub const GAIT_SNAP_EPSILON: f32 = 1e-6;

fn approach(value: &mut f32, target: f32, t: f32) {
    *value += (target - *value) * t;
    if (target - *value).abs() < GAIT_SNAP_EPSILON {
        *value = target;
    }
}

/// One sample of the trajectory window.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryPoint {
    /// Root position in network space. `y` holds the sampled ground height.
    pub position: Vector3<f32>,
    /// Facing, a pure yaw derived from `direction`.
    pub rotation: UnitQuaternion<f32>,
    /// Unit facing direction on the ground plane.
    pub direction: Vector3<f32>,
    /// Trajectory height used as the vertical root coordinate.
    pub height: f32,
    /// Gait weights at this sample.
    pub gait: GaitWeights,
}

impl Default for TrajectoryPoint {
    fn default() -> Self {
        Self::at(Vector3::zeros())
    }
}

impl TrajectoryPoint {
    /// A neutral sample at `position`, facing +Z with zero gait weights.
    #[must_use]
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
            direction: Vector3::z(),
            height: position.y,
            gait: GaitWeights::zero(),
        }
    }

    /// Root position used for encoding: ground-plane position at `height`.
    #[must_use]
    pub fn root_position(&self) -> Vector3<f32> {
        Vector3::new(self.position.x, self.height, self.position.z)
    }
}
