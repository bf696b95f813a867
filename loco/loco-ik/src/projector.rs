//! Per-foot ground projection.
//!
//! The animated ankle is blended toward a pose resting on the ground below
//! it. The blend weight follows the gait phase so the foot is planted around
//! its target phase and free to lift in between; a standing character keeps
//! both feet planted.
//!
//! # Algorithm
//!
//! 1. Probe straight down from above the toe and the ankle
//! 2. Place the ankle one heel height above the ground. On a steep step
//!    (ground gap larger than the comparison height) measure from the toe
//!    hit instead, never going below the ankle hit
//! 3. Aim the foot from the placed ankle at the raised toe hit, with the
//!    mean of the two ground normals as up
//! 4. Blend: rotation by `w`, position by `w²`

use std::f32::consts::PI;

use loco_core::TrajectoryController;
use loco_types::Terrain;
use nalgebra::{UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{FootConfig, FootCorrectionRegistry, FootHandle, Result};

/// Placement weight for a foot at `phase`.
///
/// `1 - min(|phase - target|, |phase - target - π|) / π`, plus one when
/// standing, clamped to `[0, 1]`.
#[must_use]
pub fn ik_weight(phase: f32, target_phase: f32, standing: bool) -> f32 {
    let offset = (phase - target_phase).abs().min((phase - target_phase - PI).abs());
    let mut weight = 1.0 - offset / PI;
    if standing {
        weight += 1.0;
    }
    weight.clamp(0.0, 1.0)
}

/// Corrected ankle pose, in scene space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FootPose {
    /// Ankle position.
    pub position: Vector3<f32>,
    /// Ankle orientation.
    pub rotation: UnitQuaternion<f32>,
    /// Blend weight used.
    pub weight: f32,
    /// Animated ankle height minus placed ankle height.
    pub correction: f32,
}

/// Ground hit below a joint, or the joint itself with an up normal.
struct GroundProbe {
    point: Vector3<f32>,
    normal: Vector3<f32>,
}

/// Places one foot on the ground.
#[derive(Debug, Clone, PartialEq)]
pub struct FootGroundProjector {
    config: FootConfig,
    handle: FootHandle,
}

impl FootGroundProjector {
    /// Create a projector and register its foot with `registry`.
    pub fn new(config: FootConfig, registry: &mut FootCorrectionRegistry) -> Result<Self> {
        config.validate()?;
        let handle = registry.register();
        Ok(Self { config, handle })
    }

    /// Foot configuration.
    #[must_use]
    pub fn config(&self) -> &FootConfig {
        &self.config
    }

    /// Handle of this foot in its registry.
    #[must_use]
    pub fn handle(&self) -> FootHandle {
        self.handle
    }

    /// Placement weight for this foot.
    #[must_use]
    pub fn ik_weight(&self, phase: f32, standing: bool) -> f32 {
        ik_weight(phase, self.config.target_phase, standing)
    }

    /// Place the foot of `controller` and report the correction.
    pub fn update<T: Terrain + ?Sized>(
        &self,
        controller: &TrajectoryController,
        terrain: &T,
        registry: &mut FootCorrectionRegistry,
    ) -> Result<FootPose> {
        let (toe, _) = controller.joint_scene_pose(self.config.toe);
        let (ankle, ankle_rotation) = controller.joint_scene_pose(self.config.ankle);
        let weight = self.ik_weight(controller.phase(), controller.is_standing());

        let pose = self.project(toe, ankle, ankle_rotation, weight, terrain);
        registry.report(self.handle, pose.correction)?;
        Ok(pose)
    }

    /// Project a scene-space toe and ankle onto `terrain` with a given weight.
    ///
    /// `weight` is clamped to `[0, 1]`. Does not touch any registry.
    #[must_use]
    pub fn project<T: Terrain + ?Sized>(
        &self,
        toe: Vector3<f32>,
        ankle: Vector3<f32>,
        ankle_rotation: UnitQuaternion<f32>,
        weight: f32,
        terrain: &T,
    ) -> FootPose {
        let weight = weight.clamp(0.0, 1.0);
        let heel = self.config.heel_height;
        let toe_hit = self.probe(toe, terrain);
        let ankle_hit = self.probe(ankle, terrain);

        let mut placed = ankle_hit.point;
        if (ankle_hit.point.y + heel - toe_hit.point.y).abs() > self.config.comparison_height() {
            placed.y = toe_hit.point.y + heel;
        } else {
            placed.y += heel;
        }
        placed.y = placed.y.max(ankle_hit.point.y);

        let mut toe_target = toe_hit.point;
        toe_target.y += self.config.toe_offset;

        let mut base = ankle;
        base.y = base.y.max(ankle_hit.point.y);

        let up = (ankle_hit.normal + toe_hit.normal)
            .try_normalize(1e-6)
            .unwrap_or_else(Vector3::y);
        let aim = toe_target - placed;
        let target_rotation = if aim.cross(&up).norm_squared() > 1e-12 {
            UnitQuaternion::face_towards(&aim, &up)
        } else {
            ankle_rotation
        };

        let rotation = ankle_rotation
            .try_slerp(&target_rotation, weight, 1e-6)
            .unwrap_or(if weight < 0.5 {
                ankle_rotation
            } else {
                target_rotation
            });
        let position = base.lerp(&placed, weight * weight);

        FootPose {
            position,
            rotation,
            weight,
            correction: ankle.y - position.y,
        }
    }

    fn probe<T: Terrain + ?Sized>(&self, joint: Vector3<f32>, terrain: &T) -> GroundProbe {
        let origin = joint + Vector3::y() * self.config.probe_height;
        terrain
            .raycast(origin, -Vector3::y(), self.config.probe_distance)
            .map_or(
                GroundProbe {
                    point: joint,
                    normal: Vector3::y(),
                },
                |hit| GroundProbe {
                    point: hit.point,
                    normal: hit.normal,
                },
            )
    }
}
