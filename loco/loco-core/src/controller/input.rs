//! Per-frame intent processing and future trajectory prediction.

use loco_types::{GaitWeights, MovementIntent, Terrain};

use super::{TrajectoryController, height_sample};
use crate::math::{clamp01, ground_direction, lerp, mix_directions, yaw_rotation};

/// Target velocities shorter than this keep the previous facing.
const MIN_VELOCITY: f32 = 1e-5;

impl TrajectoryController {
    /// Run the per-frame trajectory update for `intent`.
    ///
    /// Updates the smoothed input state and the center gait, probes for an
    /// auto wall, predicts the future half of the window, and resamples
    /// wall proximity, rotations and heights. Does not run the network.
    pub fn move_character<T: Terrain + ?Sized>(&mut self, intent: &MovementIntent, terrain: &T) {
        self.update_strafe(intent.strafe);
        self.update_target(intent);
        self.update_gait(intent.sprint);
        self.predict_future(terrain);
        self.update_bump();
        self.update_rotations();
        self.update_heights(terrain);
    }

    fn update_strafe(&mut self, strafe: f32) {
        self.strafe_target = strafe;
        self.strafe_amount = lerp(
            self.strafe_amount,
            self.strafe_target,
            self.config.smoothing.strafe,
        );
    }

    fn update_target(&mut self, intent: &MovementIntent) {
        let smoothing = self.config.smoothing;
        let basis = ground_direction(&intent.basis);
        let speed = self.config.movement_speed(intent.sprint);

        let desired = yaw_rotation(&basis)
            * nalgebra::Vector3::new(intent.direction.x, 0.0, intent.direction.y)
            * speed;
        self.target_velocity = self.target_velocity.lerp(&desired, smoothing.velocity);

        let velocity_direction = if self.target_velocity.norm() < MIN_VELOCITY {
            self.target_direction
        } else {
            self.target_velocity.normalize()
        };

        let facing = mix_directions(&velocity_direction, &basis, self.strafe_amount);
        self.target_direction = mix_directions(&self.target_direction, &facing, smoothing.direction);

        self.crouched_amount = lerp(self.crouched_amount, self.crouched_target, smoothing.crouch);
    }

    /// Smooth the center gait toward the gait implied by the target velocity.
    ///
    /// Priority: stand, crouch, jog (any sprint), walk.
    fn update_gait(&mut self, sprint: f32) {
        let speed = self.target_velocity.norm();
        let threshold = self.config.stand_velocity_threshold;

        let target = if speed < threshold {
            GaitWeights::standing(1.0 - clamp01(speed / threshold))
        } else if self.crouched_amount > 0.1 {
            GaitWeights::crouching(self.crouched_amount)
        } else if sprint != 0.0 {
            GaitWeights::jogging()
        } else {
            GaitWeights::walking()
        };

        let c = self.config.center();
        self.points[c].gait.lerp_towards(&target, self.config.smoothing.gait);
    }

    /// Bend the future half of the window toward the target velocity and
    /// direction.
    ///
    /// Near samples keep most of their previous motion, far samples follow
    /// the target; the bias exponents shift that curve with strafing.
    #[allow(clippy::cast_precision_loss)]
    fn predict_future<T: Terrain + ?Sized>(&mut self, terrain: &T) {
        self.detect_auto_wall(terrain);

        let c = self.config.center();
        let len = self.points.len();
        let bias_position = lerp(0.5, 1.0, self.strafe_amount);
        let bias_direction = lerp(2.0, 0.5, self.strafe_amount);

        self.blend[c] = self.points[c].position;
        for i in c + 1..len {
            let frac = (i - c) as f32 / c as f32;
            let scale_position = 1.0 - (1.0 - frac).powf(bias_position);
            let scale_direction = 1.0 - (1.0 - frac).powf(bias_direction);

            let step = self.points[i].position - self.points[i - 1].position;
            let predicted = self.blend[i - 1] + step.lerp(&self.target_velocity, scale_position);
            self.blend[i] = self.push_out_of_walls(predicted);

            let center = self.points[c];
            let point = &mut self.points[i];
            point.direction = mix_directions(&point.direction, &self.target_direction, scale_direction);
            point.height = center.height;
            point.gait = center.gait;
        }

        for i in c + 1..len {
            self.points[i].position = self.blend[i];
        }
    }

    fn update_rotations(&mut self) {
        for point in &mut self.points {
            point.rotation = yaw_rotation(&point.direction);
        }
    }

    /// Resample ground heights for "now" and the future, then set the
    /// center height to the mean over the encoded samples.
    #[allow(clippy::cast_precision_loss)]
    fn update_heights<T: Terrain + ?Sized>(&mut self, terrain: &T) {
        let c = self.config.center();
        let scale = self.config.scale_factor;
        for point in &mut self.points[c..] {
            point.position.y = height_sample(terrain, scale, &point.position);
        }

        let samples = self.layout.samples();
        let sum: f32 = self.points.iter().step_by(10).map(|p| p.position.y).sum();
        self.points[c].height = sum / samples as f32;
    }
}
