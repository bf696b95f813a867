//! Cyclic waypoint following.

use loco_types::{MovementIntent, Terrain};
use nalgebra::Vector3;
use tracing::debug;

use crate::{FrameReport, Result, TrajectoryController};

/// Default distance (scene units) at which a waypoint counts as reached.
pub const DEFAULT_ARRIVAL_RADIUS: f32 = 2.5;

/// Produces intents that walk a character through a loop of scene-space
/// waypoints.
///
/// The follower targets one waypoint at a time and moves on to the next,
/// wrapping at the end, once the character's root is within
/// [`arrival_radius`](Self::arrival_radius) on the ground plane.
///
/// # Example
///
/// ```
/// use loco_core::WaypointFollower;
/// use nalgebra::Vector3;
///
/// let follower = WaypointFollower::new(vec![
///     Vector3::new(0.0, 0.0, 10.0),
///     Vector3::new(10.0, 0.0, 10.0),
/// ])
/// .sprint(0.5);
/// assert_eq!(follower.current_target(), Some(Vector3::new(0.0, 0.0, 10.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointFollower {
    waypoints: Vec<Vector3<f32>>,
    current: usize,
    arrival_radius: f32,
    sprint: f32,
    strafe: f32,
    target_distance: f32,
}

impl WaypointFollower {
    /// Follow `waypoints` in order, starting with the first.
    #[must_use]
    pub fn new(waypoints: Vec<Vector3<f32>>) -> Self {
        Self {
            waypoints,
            current: 0,
            arrival_radius: DEFAULT_ARRIVAL_RADIUS,
            sprint: 0.0,
            strafe: 0.0,
            target_distance: 0.0,
        }
    }

    /// Set the arrival radius.
    #[must_use]
    pub fn arrival_radius(mut self, radius: f32) -> Self {
        self.arrival_radius = radius;
        self
    }

    /// Set the sprint amount used for every intent.
    #[must_use]
    pub fn sprint(mut self, sprint: f32) -> Self {
        self.sprint = sprint;
        self
    }

    /// Set the strafe amount used for every intent.
    #[must_use]
    pub fn strafe(mut self, strafe: f32) -> Self {
        self.strafe = strafe;
        self
    }

    /// Set the stopping distance passed to
    /// [`TrajectoryController::intent_towards`].
    #[must_use]
    pub fn target_distance(mut self, distance: f32) -> Self {
        self.target_distance = distance;
        self
    }

    /// The waypoint loop.
    #[must_use]
    pub fn waypoints(&self) -> &[Vector3<f32>] {
        &self.waypoints
    }

    /// Index of the waypoint being approached.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The waypoint being approached, or `None` without waypoints.
    #[must_use]
    pub fn current_target(&self) -> Option<Vector3<f32>> {
        self.waypoints.get(self.current).copied()
    }

    /// Intent toward the current waypoint.
    ///
    /// Advances to the next waypoint first if the character has arrived.
    /// Without waypoints the intent is idle.
    pub fn intent(&mut self, controller: &TrajectoryController) -> MovementIntent {
        let Some(target) = self.current_target() else {
            return MovementIntent::idle();
        };

        let root = controller.scene_root();
        let dx = target.x - root.x;
        let dz = target.z - root.z;
        if dx * dx + dz * dz < self.arrival_radius * self.arrival_radius {
            self.current = (self.current + 1) % self.waypoints.len();
            debug!(index = self.current, "waypoint reached");
        }

        let target = self.waypoints[self.current];
        controller.intent_towards(target, self.sprint, self.strafe, self.target_distance)
    }

    /// Advance `controller` by one frame toward the current waypoint.
    pub fn follow<T: Terrain + ?Sized>(
        &mut self,
        controller: &mut TrajectoryController,
        dt: f32,
        terrain: &T,
    ) -> Result<FrameReport> {
        let intent = self.intent(controller);
        controller.advance(&intent, dt, terrain)
    }
}
