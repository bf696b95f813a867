//! Frame driver: intent processing plus fixed-rate network ticks.

use loco_types::{LocoError, MovementIntent, Terrain};
use nalgebra::{Vector2, Vector3};
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::TrajectoryController;
use crate::Result;

/// What one call to [`TrajectoryController::advance`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameReport {
    /// Network ticks run this frame.
    pub ticks: u32,
    /// Whether catch-up ticks were discarded because of the per-frame cap.
    pub dropped_ticks: bool,
}

impl TrajectoryController {
    /// Advance the character by one frame of `dt` seconds.
    ///
    /// Runs [`move_character`](Self::move_character) once, then as many
    /// network ticks as the tick accumulator allows, up to
    /// `max_ticks_per_frame`. While standing, the accumulator restarts after
    /// each tick instead of carrying the remainder.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is negative or non-finite, or if a tick
    /// diverges. After a divergence call [`reset`](Self::reset).
    pub fn advance<T: Terrain + ?Sized>(
        &mut self,
        intent: &MovementIntent,
        dt: f32,
        terrain: &T,
    ) -> Result<FrameReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(LocoError::invalid_config(format!(
                "frame time must be finite and non-negative, got {dt}"
            ))
            .into());
        }

        self.move_character(intent, terrain);
        self.auto_wall.elapse(dt);

        let interval = self.config.tick_interval;
        let max_ticks = self.config.max_ticks_per_frame;
        let mut report = FrameReport::default();

        while self.timer <= 0.0 && report.ticks < max_ticks {
            self.step_network(terrain)?;
            report.ticks += 1;
            if self.is_standing() {
                self.timer = interval;
            } else {
                self.timer += interval;
            }
        }

        if self.timer <= 0.0 {
            warn!(
                ticks = report.ticks,
                behind = -self.timer,
                "tick cap reached, dropping catch-up"
            );
            report.dropped_ticks = true;
            self.timer = interval;
        }

        self.timer -= dt;
        Ok(report)
    }

    /// Intent that steers toward a scene-space `point`.
    ///
    /// The direction is taken on the ground plane from the scene root. The
    /// character stops once a look-ahead of one movement step lands within
    /// `target_distance` of the point.
    #[must_use]
    pub fn intent_towards(
        &self,
        point: Vector3<f32>,
        sprint: f32,
        strafe: f32,
        target_distance: f32,
    ) -> MovementIntent {
        let root = self.scene_root();
        let offset = Vector2::new(point.x - root.x, point.z - root.z);

        let direction = match offset.try_normalize(1e-6) {
            Some(direction) => {
                let ahead = offset - direction * self.config.movement_speed(sprint);
                if ahead.norm_squared() <= target_distance * target_distance {
                    Vector2::zeros()
                } else {
                    direction
                }
            }
            None => Vector2::zeros(),
        };

        MovementIntent::new(direction).sprint(sprint).strafe(strafe)
    }
}
