//! Network tick: encode, evaluate, decode, integrate.

use std::f32::consts::TAU;

use loco_types::{JOINT_COUNT, LocoError, Terrain};
use nalgebra::Vector3;
use tracing::trace;

use super::{TrajectoryController, height_sample};
use crate::Result;
use crate::math::{quat_exp, rotate_y, yaw_rotation};

/// Read three consecutive floats as a vector.
#[inline]
fn vec3_at(data: &[f32], offset: usize) -> Vector3<f32> {
    Vector3::new(data[offset], data[offset + 1], data[offset + 2])
}

/// Write a vector into three consecutive floats.
#[inline]
fn write_vec3(data: &mut [f32], offset: usize, v: &Vector3<f32>) {
    data[offset] = v.x;
    data[offset + 1] = v.y;
    data[offset + 2] = v.z;
}

impl TrajectoryController {
    /// Run one network tick against the current trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`LocoError::Diverged`] if the phase or root becomes
    /// non-finite, or a network error if the forward pass fails.
    pub fn step_network<T: Terrain + ?Sized>(&mut self, terrain: &T) -> Result<()> {
        self.encode_input(terrain);
        self.engine.compute(&mut self.scratch, self.phase)?;
        self.decode_joints(true);
        self.integrate_output()?;
        self.advance_phase()?;

        trace!(
            phase = self.phase,
            stand = self.center().gait.stand,
            "network tick"
        );
        Ok(())
    }

    /// Fill the network input from the trajectory and previous pose.
    fn encode_input<T: Terrain + ?Sized>(&mut self, terrain: &T) {
        let layout = self.layout;
        let c = self.config.center();
        let scale = self.config.scale_factor;
        let side = self.config.side_points_offset;
        let Self {
            scratch,
            points,
            joints,
            ..
        } = self;
        let x = scratch.x.as_mut_slice();

        let root = points[c].root_position();
        let root_inv = points[c].rotation.inverse();

        for (k, point) in points.iter().step_by(10).enumerate() {
            let position = root_inv * (point.position - root);
            let direction = root_inv * point.direction;
            x[layout.trajectory(0) + k] = position.x;
            x[layout.trajectory(1) + k] = position.z;
            x[layout.trajectory(2) + k] = direction.x;
            x[layout.trajectory(3) + k] = direction.z;

            let gait = &point.gait;
            x[layout.gait(0) + k] = gait.stand;
            x[layout.gait(1) + k] = gait.walk;
            x[layout.gait(2) + k] = gait.jog;
            x[layout.gait(3) + k] = gait.crouch;
            x[layout.gait(4) + k] = gait.jump;
            x[layout.gait(5) + k] = 0.0;
        }

        let prev = &points[c - 1];
        let prev_root = prev.root_position();
        let prev_inv = prev.rotation.inverse();
        let pos_offset = layout.input_joint_positions();
        let vel_offset = layout.input_joint_velocities();
        for (j, joint) in joints.iter().enumerate() {
            write_vec3(x, pos_offset + j * 3, &(prev_inv * (joint.position - prev_root)));
            write_vec3(x, vel_offset + j * 3, &(prev_inv * joint.velocity));
        }

        for (k, point) in points.iter().step_by(10).enumerate() {
            let right = point.position + point.rotation * Vector3::new(side, 0.0, 0.0);
            let left = point.position + point.rotation * Vector3::new(-side, 0.0, 0.0);
            x[layout.height(0) + k] = height_sample(terrain, scale, &right) - root.y;
            x[layout.height(1) + k] = point.position.y - root.y;
            x[layout.height(2) + k] = height_sample(terrain, scale, &left) - root.y;
        }
    }

    /// Decode joint transforms from the network output, relative to the
    /// current root.
    ///
    /// With `smooth`, positions blend between the velocity-integrated
    /// previous position and the predicted one.
    pub(super) fn decode_joints(&mut self, smooth: bool) {
        let layout = self.layout;
        let c = self.config.center();
        let blend = self.config.smoothing.joint;
        let root = self.points[c].root_position();
        let root_rot = self.points[c].rotation;
        let y = self.scratch.y.as_slice();

        for (j, joint) in self.joints.iter_mut().enumerate().take(JOINT_COUNT) {
            let position = root_rot * vec3_at(y, layout.output_joint_positions() + j * 3) + root;
            let velocity = root_rot * vec3_at(y, layout.output_joint_velocities() + j * 3);
            let rotation = root_rot * quat_exp(&vec3_at(y, layout.output_joint_rotations() + j * 3));

            joint.position = if smooth {
                (joint.position + velocity).lerp(&position, blend)
            } else {
                position
            };
            joint.velocity = velocity;
            joint.rotation = rotation;
        }
    }

    /// Shift the window, move the root, and resample the future from the
    /// network's predicted samples.
    #[allow(clippy::cast_precision_loss)]
    fn integrate_output(&mut self) -> Result<()> {
        let layout = self.layout;
        let c = self.config.center();
        let len = self.points.len();

        self.points.copy_within(1..=c, 0);

        let stand_amount = self.stand_amount();
        let y = self.scratch.y.as_slice();
        let (dx, dz, turn) = (y[0], y[1], y[2]);

        let center = &mut self.points[c];
        center.position += stand_amount * (center.rotation * Vector3::new(dx, 0.0, dz));
        center.direction = rotate_y(stand_amount * -turn) * center.direction;
        center.rotation = yaw_rotation(&center.direction);

        let pushed = self.push_out_of_walls(self.points[c].position);
        self.points[c].position = pushed;

        let center = self.points[c];
        if !center.position.iter().all(|v| v.is_finite()) {
            return Err(LocoError::diverged("root position is not finite").into());
        }

        let last = layout.future_samples() - 1;
        let y = self.scratch.y.as_slice();
        for i in c + 1..len {
            let offset = (i - c) as f32 / 10.0;
            let m = offset.fract();
            let k = (i - c) / 10;
            let k1 = (k + 1).min(last);
            let sample = |channel: usize| {
                let base = layout.future(channel);
                (1.0 - m) * y[base + k] + m * y[base + k1]
            };

            let local_position = Vector3::new(sample(0), 0.0, sample(1));
            let local_direction = Vector3::new(sample(2), 0.0, sample(3));

            let point = &mut self.points[i];
            point.position = center.rotation * local_position + center.position;
            point.direction = (center.rotation * local_direction)
                .try_normalize(1e-6)
                .unwrap_or(center.direction);
            point.rotation = yaw_rotation(&point.direction);
        }
        Ok(())
    }

    /// Advance the phase by the network's phase delta, wrapped to `[0, 2π)`.
    fn advance_phase(&mut self) -> Result<()> {
        let delta = self.scratch.y.as_slice()[3];
        let rate = self.stand_amount() * 0.9 + 0.1;
        let mut phase = (self.phase + rate * TAU * delta).rem_euclid(TAU);
        if phase >= TAU {
            phase = 0.0;
        }
        if !phase.is_finite() {
            return Err(LocoError::diverged(format!("phase is {phase}")).into());
        }
        self.phase = phase;
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use approx::assert_relative_eq;
    use loco_nn::{InferenceEngine, ModelParameters, NetworkConfig};
    use loco_types::{JointId, LocomotionConfig, MovementIntent, RaycastHit};

    struct Flat;

    impl Terrain for Flat {
        fn ground_height(&self, _x: f32, _z: f32) -> Option<f32> {
            Some(0.0)
        }

        fn raycast(&self, _o: Vector3<f32>, _d: Vector3<f32>, _m: f32) -> Option<RaycastHit> {
            None
        }
    }

    /// Controller whose network always outputs `y`.
    fn controller_with_output(y: impl Fn(&mut [f32])) -> TrajectoryController {
        let config = NetworkConfig::with_sizes(342, 311, 8);
        let mut params = ModelParameters::zeros(&config);
        y(params.normalization.y_mean.as_mut_slice());
        let engine = Arc::new(InferenceEngine::from_parameters(config, params).unwrap());
        TrajectoryController::new(engine, LocomotionConfig::default()).unwrap()
    }

    #[test]
    fn test_phase_advances_by_delta() {
        let mut c = controller_with_output(|y| y[3] = 0.05);
        c.step_network(&Flat).unwrap();
        // Stand gait is zero after reset, so the full rate applies.
        assert_relative_eq!(c.phase(), TAU * 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_phase_wraps() {
        let mut c = controller_with_output(|y| y[3] = 0.3);
        for _ in 0..10 {
            c.step_network(&Flat).unwrap();
            assert!((0.0..TAU).contains(&c.phase()));
        }
        // Three full cycles land back at the start, from either side.
        let distance = c.phase().min(TAU - c.phase());
        assert!(distance < 1e-3);
    }

    #[test]
    fn test_negative_phase_delta_wraps() {
        let mut c = controller_with_output(|y| y[3] = -0.1);
        c.step_network(&Flat).unwrap();
        assert_relative_eq!(c.phase(), TAU * 0.9, epsilon = 1e-4);
    }

    #[test]
    fn test_non_finite_output_diverges() {
        let mut c = controller_with_output(|y| y[3] = f32::INFINITY);
        let err = c.step_network(&Flat).unwrap_err();
        assert!(err.is_diverged());
    }

    #[test]
    fn test_root_delta_moves_center() {
        let mut c = controller_with_output(|y| y[1] = 2.0);
        c.step_network(&Flat).unwrap();
        assert_relative_eq!(c.center().position.z, 2.0, epsilon = 1e-5);
        // The past shifted by one sample.
        assert_relative_eq!(c.trajectory()[59].position.z, 0.0);
    }

    #[test]
    fn test_heading_delta_turns_center() {
        let mut c = controller_with_output(|y| y[2] = 0.1);
        c.step_network(&Flat).unwrap();
        let dir = c.center().direction;
        assert_relative_eq!(dir.x.atan2(dir.z), -0.1, epsilon = 1e-5);
        assert_relative_eq!(c.center().rotation * Vector3::z(), dir, epsilon = 1e-5);
    }

    #[test]
    fn test_future_resampled_from_output() {
        let mut c = controller_with_output(|y| {
            // Future pos Z channel: samples at 10, 20, .. 60 units ahead.
            for k in 0..6 {
                y[8 + 6 + k] = 10.0 * (k as f32 + 1.0);
                y[8 + 18 + k] = 1.0;
            }
        });
        c.step_network(&Flat).unwrap();
        let traj = c.trajectory();
        assert_relative_eq!(traj[70].position.z, 20.0, epsilon = 1e-4);
        assert_relative_eq!(traj[65].position.z, 15.0, epsilon = 1e-4);
        assert_relative_eq!(traj[119].position.z, 60.0, epsilon = 1e-4);
        assert_relative_eq!(traj[90].direction, Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_future_direction_uses_center() {
        let mut c = controller_with_output(|_| {});
        c.step_network(&Flat).unwrap();
        for p in &c.trajectory()[61..] {
            assert_eq!(p.direction, c.center().direction);
        }
    }

    #[test]
    fn test_joint_smoothing() {
        let mut c = controller_with_output(|y| {
            y[32 + 1] = 4.0;
        });
        // Move the hips away; one tick blends halfway back.
        c.joints[JointId::Hips.index()].position = Vector3::new(0.0, 0.0, 0.0);
        c.step_network(&Flat).unwrap();
        assert_relative_eq!(c.joint(JointId::Hips).position.y, 2.0, epsilon = 1e-5);
        c.step_network(&Flat).unwrap();
        assert_relative_eq!(c.joint(JointId::Hips).position.y, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_encoding_layout() {
        let mut c = controller_with_output(|_| {});
        for _ in 0..5 {
            c.move_character(&MovementIntent::forward(), &Flat);
        }
        c.encode_input(&Flat);
        let x = c.scratch.x.as_slice();
        // Center sample sits at the root.
        assert_relative_eq!(x[6], 0.0);
        assert_relative_eq!(x[12 + 6], 0.0);
        // Future samples lie ahead, along local +Z.
        assert!(x[12 + 11] > 0.0);
        // Facing +Z everywhere.
        assert_relative_eq!(x[36 + 6], 1.0, epsilon = 1e-6);
        // Walk gait reaches the future samples.
        assert!(x[60 + 11] > 0.0);
        // Unused gait slot.
        assert!(x[108..120].iter().all(|&v| v == 0.0));
        // Flat terrain: all height offsets zero.
        assert!(x[306..342].iter().all(|&v| v.abs() < 1e-6));
    }
}
