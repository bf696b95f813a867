//! Per-character trajectory controller.
//!
//! The controller owns a rolling window of trajectory samples centered on
//! "now", the decoded skeleton, and the gait phase. Each frame it turns a
//! [`MovementIntent`] into a predicted future trajectory; each network tick
//! it encodes that trajectory, runs the engine, and integrates the result.
//!
//! # Frame
//!
//! 1. Strafe, target velocity and direction, and gait smoothing
//! 2. Auto-wall probe, then future prediction with wall push-out
//! 3. Wall proximity (`bump`) for every sample
//! 4. Sample rotations and ground heights
//!
//! # Tick
//!
//! 5. Encode the window and previous pose
//! 6. Forward pass at the current phase
//! 7. Decode joints, blending positions with the velocity prediction
//! 8. Shift the past, apply the root delta, resample the future
//! 9. Advance the phase
//!
//! [`advance`](TrajectoryController::advance) runs one frame and as many
//! ticks as the 60 Hz accumulator allows.
//!
//! # Spaces
//!
//! Trajectory samples and joints are in network space. Walls, terrain
//! queries and [`scene_root`](TrajectoryController::scene_root) are in scene
//! space, which is network space times `scale_factor`.

mod advance;
mod input;
mod network;
mod walls;

use std::sync::Arc;

use loco_nn::{InferenceEngine, NetworkScratch};
use loco_types::{
    JOINT_COUNT, Joint, JointId, LocoError, LocomotionConfig, MovementIntent, Terrain,
    TrajectoryPoint, WallSegment,
};
use nalgebra::{UnitQuaternion, Vector3};
use tracing::{debug, warn};

use crate::{NetworkLayout, Result};

pub use advance::FrameReport;
pub use walls::AutoWall;

/// Ground height below a network-space point, in network units.
///
/// Points without terrain below them sample as zero.
pub(crate) fn height_sample<T: Terrain + ?Sized>(
    terrain: &T,
    scale: f32,
    position: &Vector3<f32>,
) -> f32 {
    terrain
        .ground_height(position.x * scale, position.z * scale)
        .map_or(0.0, |h| h / scale)
}

/// Drives one character with a shared [`InferenceEngine`].
#[derive(Debug, Clone)]
pub struct TrajectoryController {
    engine: Arc<InferenceEngine>,
    config: LocomotionConfig,
    layout: NetworkLayout,
    scratch: NetworkScratch,
    joints: [Joint; JOINT_COUNT],
    points: Vec<TrajectoryPoint>,
    /// Reused buffer for predicted positions.
    blend: Vec<Vector3<f32>>,
    phase: f32,
    strafe_amount: f32,
    strafe_target: f32,
    crouched_amount: f32,
    crouched_target: f32,
    target_direction: Vector3<f32>,
    target_velocity: Vector3<f32>,
    walls: Vec<WallSegment>,
    auto_wall: AutoWall,
    /// Seconds until the next network tick.
    timer: f32,
}

impl TrajectoryController {
    /// Create a controller standing at the network-space origin.
    ///
    /// Call [`reset`](Self::reset) to place it on terrain.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the engine's
    /// layer sizes do not match the trajectory layout.
    pub fn new(engine: Arc<InferenceEngine>, config: LocomotionConfig) -> Result<Self> {
        config.validate()?;
        let layout = NetworkLayout::from_config(&config);
        layout.check(&engine)?;

        let len = config.trajectory_length();
        let scratch = engine.scratch();
        let mut controller = Self {
            engine,
            layout,
            scratch,
            joints: [Joint::default(); JOINT_COUNT],
            points: vec![TrajectoryPoint::default(); len],
            blend: vec![Vector3::zeros(); len],
            phase: 0.0,
            strafe_amount: 0.0,
            strafe_target: 0.0,
            crouched_amount: 0.0,
            crouched_target: 0.0,
            target_direction: Vector3::z(),
            target_velocity: Vector3::zeros(),
            walls: Vec::new(),
            auto_wall: AutoWall::default(),
            timer: config.tick_interval,
            config,
        };
        controller.reset_to(Vector3::zeros())?;
        Ok(controller)
    }

    /// Place the character at a scene-space position, on the ground.
    ///
    /// The skeleton takes the network's neutral pose, every trajectory
    /// sample collapses onto the root facing +Z, and all smoothed input
    /// state starts over.
    pub fn reset<T: Terrain + ?Sized>(
        &mut self,
        scene_position: Vector3<f32>,
        terrain: &T,
    ) -> Result<()> {
        let inv = self.config.inverse_scale();
        let mut root = Vector3::new(scene_position.x * inv, 0.0, scene_position.z * inv);
        root.y = height_sample(terrain, self.config.scale_factor, &root);
        self.reset_to(root)
    }

    fn reset_to(&mut self, root: Vector3<f32>) -> Result<()> {
        if !root.iter().all(|v| v.is_finite()) {
            return Err(LocoError::invalid_config("reset position must be finite").into());
        }

        self.engine.reset(&mut self.scratch)?;

        for point in &mut self.points {
            *point = TrajectoryPoint::at(root);
        }
        self.decode_joints(false);

        self.phase = 0.0;
        self.strafe_amount = 0.0;
        self.strafe_target = 0.0;
        self.crouched_amount = 0.0;
        self.crouched_target = 0.0;
        self.target_direction = Vector3::z();
        self.target_velocity = Vector3::zeros();
        self.auto_wall = AutoWall::default();
        self.timer = self.config.tick_interval;

        debug!(x = root.x, y = root.y, z = root.z, "controller reset");
        Ok(())
    }

    // ==================== Accessors ====================

    /// Locomotion configuration.
    #[must_use]
    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Shared inference engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<InferenceEngine> {
        &self.engine
    }

    /// Vector layout used to talk to the engine.
    #[must_use]
    pub fn layout(&self) -> &NetworkLayout {
        &self.layout
    }

    /// One joint of the decoded skeleton, in network space.
    #[must_use]
    pub fn joint(&self, id: JointId) -> &Joint {
        &self.joints[id.index()]
    }

    /// All joints, indexed by [`JointId::index`].
    #[must_use]
    pub fn joints(&self) -> &[Joint; JOINT_COUNT] {
        &self.joints
    }

    /// Joint position and rotation in scene space.
    #[must_use]
    pub fn joint_scene_pose(&self, id: JointId) -> (Vector3<f32>, UnitQuaternion<f32>) {
        let joint = self.joint(id);
        (joint.position * self.config.scale_factor, joint.rotation)
    }

    /// The trajectory window, oldest sample first.
    #[must_use]
    pub fn trajectory(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// The "now" sample.
    #[must_use]
    pub fn center(&self) -> &TrajectoryPoint {
        &self.points[self.config.center()]
    }

    /// Character root in scene space.
    #[must_use]
    pub fn scene_root(&self) -> Vector3<f32> {
        self.center().position * self.config.scale_factor
    }

    /// Gait phase in `[0, 2π)`.
    #[must_use]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Smoothed strafe amount.
    #[must_use]
    pub fn strafe_amount(&self) -> f32 {
        self.strafe_amount
    }

    /// Smoothed crouch amount.
    #[must_use]
    pub fn crouched_amount(&self) -> f32 {
        self.crouched_amount
    }

    /// Smoothed desired velocity, network units per tick.
    #[must_use]
    pub fn target_velocity(&self) -> Vector3<f32> {
        self.target_velocity
    }

    /// Smoothed desired facing.
    #[must_use]
    pub fn target_direction(&self) -> Vector3<f32> {
        self.target_direction
    }

    /// Whether the stand gait at the center exceeds the standing threshold.
    #[must_use]
    pub fn is_standing(&self) -> bool {
        self.center().gait.stand > self.config.standing_threshold
    }

    /// Scale applied to root motion: `(1 - stand)^0.25`.
    #[must_use]
    pub fn stand_amount(&self) -> f32 {
        (1.0 - self.center().gait.stand).max(0.0).powf(0.25)
    }

    // ==================== Crouch ====================

    /// Toggle crouching.
    pub fn crouch(&mut self) {
        self.crouched_target = if self.crouched_target == 0.0 { 1.0 } else { 0.0 };
    }

    /// Set the crouch target directly, clamped to `[0, 1]`.
    pub fn set_crouch_target(&mut self, target: f32) {
        self.crouched_target = target.clamp(0.0, 1.0);
    }

    /// Current crouch target.
    #[must_use]
    pub fn crouch_target(&self) -> f32 {
        self.crouched_target
    }

    // ==================== Walls ====================

    /// Add a static wall in scene space.
    ///
    /// # Errors
    ///
    /// Rejects degenerate or non-finite segments.
    pub fn add_wall(&mut self, wall: WallSegment) -> Result<()> {
        if let Err(e) = wall.validate() {
            warn!(error = %e, "rejected wall segment");
            return Err(e.into());
        }
        self.walls.push(wall);
        Ok(())
    }

    /// Remove all static walls.
    pub fn clear_walls(&mut self) {
        self.walls.clear();
    }

    /// Static walls.
    #[must_use]
    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    /// The automatically detected wall and its clear timer.
    #[must_use]
    pub fn auto_wall(&self) -> &AutoWall {
        &self.auto_wall
    }

    /// Every active wall: static walls, then the auto wall if present.
    pub fn active_walls(&self) -> impl Iterator<Item = &WallSegment> {
        self.walls.iter().chain(self.auto_wall.segment())
    }

    /// Build an intent and run the per-frame trajectory update.
    ///
    /// Equivalent to [`move_character`](Self::move_character) with the
    /// intent from [`intent_towards`](Self::intent_towards).
    pub fn move_character_to<T: Terrain + ?Sized>(
        &mut self,
        point: Vector3<f32>,
        sprint: f32,
        strafe: f32,
        target_distance: f32,
        terrain: &T,
    ) {
        let intent = self.intent_towards(point, sprint, strafe, target_distance);
        self.move_character(&intent, terrain);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use loco_nn::{ModelParameters, NetworkConfig};
    use nalgebra::Vector2;

    struct Flat(f32);

    impl Terrain for Flat {
        fn ground_height(&self, _x: f32, _z: f32) -> Option<f32> {
            Some(self.0)
        }

        fn raycast(
            &self,
            _origin: Vector3<f32>,
            _direction: Vector3<f32>,
            _max_distance: f32,
        ) -> Option<loco_types::RaycastHit> {
            None
        }
    }

    fn engine_with_pose() -> Arc<InferenceEngine> {
        let config = NetworkConfig::with_sizes(342, 311, 8);
        let mut params = ModelParameters::zeros(&config);
        // Hips one unit up, everything else at the root.
        params.normalization.y_mean.as_mut_slice()[32 + 1] = 1.0;
        Arc::new(InferenceEngine::from_parameters(config, params).unwrap())
    }

    fn controller() -> TrajectoryController {
        TrajectoryController::new(engine_with_pose(), LocomotionConfig::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_layout_mismatch() {
        let engine = Arc::new(InferenceEngine::zeros(NetworkConfig::with_sizes(300, 311, 8)).unwrap());
        let err = TrajectoryController::new(engine, LocomotionConfig::default()).unwrap_err();
        assert!(matches!(err, crate::ControllerError::LayoutMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = LocomotionConfig::default();
        config.trajectory_projections = 3;
        assert!(TrajectoryController::new(engine_with_pose(), config).is_err());
    }

    #[test]
    fn test_reset_places_root_on_ground() {
        let mut c = controller();
        c.reset(Vector3::new(2.0, 10.0, -4.0), &Flat(0.4)).unwrap();

        let center = c.center();
        assert_relative_eq!(center.position.x, 50.0, epsilon = 1e-4);
        assert_relative_eq!(center.position.z, -100.0, epsilon = 1e-4);
        assert_relative_eq!(center.position.y, 10.0, epsilon = 1e-4);
        assert_relative_eq!(center.height, 10.0, epsilon = 1e-4);
        assert!(c.trajectory().iter().all(|p| p.direction == Vector3::z()));
        assert_eq!(c.phase(), 0.0);

        let hips = c.joint(JointId::Hips);
        assert_relative_eq!(hips.position, Vector3::new(50.0, 11.0, -100.0), epsilon = 1e-4);
        assert_relative_eq!(c.scene_root(), Vector3::new(2.0, 0.4, -4.0), epsilon = 1e-5);

        let (scene_hips, _) = c.joint_scene_pose(JointId::Hips);
        assert_relative_eq!(scene_hips.y, 0.44, epsilon = 1e-5);
    }

    #[test]
    fn test_crouch_toggles() {
        let mut c = controller();
        assert_eq!(c.crouch_target(), 0.0);
        c.crouch();
        assert_eq!(c.crouch_target(), 1.0);
        c.crouch();
        assert_eq!(c.crouch_target(), 0.0);
        c.set_crouch_target(3.0);
        assert_eq!(c.crouch_target(), 1.0);
    }

    #[test]
    fn test_walls() {
        let mut c = controller();
        let wall = WallSegment::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        c.add_wall(wall).unwrap();
        assert_eq!(c.walls().len(), 1);
        assert_eq!(c.active_walls().count(), 1);

        let degenerate = WallSegment::new_unchecked(Vector2::new(1.0, 1.0), Vector2::new(1.0, 1.0));
        assert!(c.add_wall(degenerate).is_err());
        assert_eq!(c.walls().len(), 1);

        c.clear_walls();
        assert!(c.walls().is_empty());
    }

    #[test]
    fn test_height_sample_scales() {
        let h = height_sample(&Flat(0.2), 0.04, &Vector3::new(10.0, 0.0, 10.0));
        assert_relative_eq!(h, 5.0, epsilon = 1e-5);
    }
}
