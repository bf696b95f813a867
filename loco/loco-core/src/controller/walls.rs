//! Wall avoidance and automatic wall detection.

use loco_types::{JointId, Terrain, WallSegment};
use nalgebra::{Vector2, Vector3};
use tracing::debug;

use super::TrajectoryController;
use crate::math::{bump_weight, push_out};

/// Wall placed in front of the character when a probe finds a vertical
/// obstacle, plus the timer that clears it once the obstacle is gone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AutoWall {
    segment: Option<WallSegment>,
    /// Seconds until the wall is cleared; `None` while the probe keeps hitting.
    clear_in: Option<f32>,
}

impl AutoWall {
    /// The detected wall, in scene space.
    #[must_use]
    pub fn segment(&self) -> Option<&WallSegment> {
        self.segment.as_ref()
    }

    /// Whether a wall is set.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.segment.is_some()
    }

    /// Seconds left before the wall is cleared, if a clear is pending.
    #[must_use]
    pub fn pending_clear(&self) -> Option<f32> {
        self.clear_in
    }

    /// Store a fresh detection and cancel any pending clear.
    pub(crate) fn detected(&mut self, segment: WallSegment) {
        if self.segment.is_none() {
            debug!(
                start = ?segment.start,
                end = ?segment.end,
                "auto wall set"
            );
        }
        self.segment = Some(segment);
        self.clear_in = None;
    }

    /// Record a frame without detection; starts the clear timer if idle.
    pub(crate) fn missed(&mut self, delay: f32) {
        if self.segment.is_some() && self.clear_in.is_none() {
            self.clear_in = Some(delay);
        }
    }

    /// Let `dt` seconds pass.
    pub(crate) fn elapse(&mut self, dt: f32) {
        if let Some(remaining) = self.clear_in {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                debug!("auto wall cleared");
                self.segment = None;
                self.clear_in = None;
            } else {
                self.clear_in = Some(remaining);
            }
        }
    }
}

impl TrajectoryController {
    /// Probe forward from hip and foot height for a vertical obstacle.
    ///
    /// Both rays must hit, and the horizontal gap between the hits (the
    /// "shadow") must be shorter than `auto_wall_shadow_length`; a longer
    /// shadow is a slope the character can walk up.
    pub(super) fn detect_auto_wall<T: Terrain + ?Sized>(&mut self, terrain: &T) {
        match self.probe_auto_wall(terrain) {
            Some(segment) => self.auto_wall.detected(segment),
            None => self.auto_wall.missed(self.config.auto_wall_clear_delay),
        }
    }

    fn probe_auto_wall<T: Terrain + ?Sized>(&self, terrain: &T) -> Option<WallSegment> {
        let s = self.config.scale_factor;
        let width = self.config.wall_width;
        let shadow_len = self.config.auto_wall_shadow_length;

        let hips = self.joint(JointId::Hips);
        let up_origin = hips.position * s;
        let mut forward = hips.rotation * Vector3::z();
        forward.y = 0.0;
        let forward = forward.try_normalize(1e-6)?;
        let right = hips.rotation * Vector3::x();

        let max_distance = shadow_len * 2.0 + width;
        let up_hit = terrain.raycast(up_origin, forward, max_distance)?;

        let feet_y = (self.joint(JointId::RightFoot).position.y
            + self.joint(JointId::LeftFoot).position.y)
            * 0.5
            * s;
        let down_origin = Vector3::new(up_origin.x, feet_y, up_origin.z);
        let down_hit = terrain.raycast(down_origin, forward, max_distance)?;

        let gap = (up_hit.point - down_hit.point).dot(&forward);
        if gap * gap >= shadow_len * shadow_len {
            return None;
        }

        let midpoint = (up_origin + down_origin) * 0.5;
        let closer = if (down_hit.point - midpoint).norm_squared()
            < (up_hit.point - midpoint).norm_squared()
        {
            down_hit.point
        } else {
            up_hit.point
        };

        let start = closer + right - forward * width;
        let end = closer - right - forward * width;
        WallSegment::new(Vector2::new(start.x, start.z), Vector2::new(end.x, end.z)).ok()
    }

    /// Push a network-space point out of every active wall, in order.
    pub(super) fn push_out_of_walls(&self, position: Vector3<f32>) -> Vector3<f32> {
        let s = self.config.scale_factor;
        let (width, val) = (self.config.wall_width, self.config.wall_val);

        let mut point = Vector2::new(position.x * s, position.z * s);
        for wall in self.active_walls() {
            if let Some(pushed) = push_out(point, wall, width, val) {
                point = pushed;
            }
        }

        let inv = self.config.inverse_scale();
        Vector3::new(point.x * inv, position.y, point.y * inv)
    }

    /// Set every sample's `bump` gait from its nearest wall.
    pub(super) fn update_bump(&mut self) {
        let s = self.config.scale_factor;
        let (width, val) = (self.config.wall_width, self.config.wall_val);

        for i in 0..self.points.len() {
            let p = self.points[i].position;
            let point = Vector2::new(p.x * s, p.z * s);
            let bump = self
                .active_walls()
                .map(|wall| bump_weight(point, wall, width, val))
                .fold(0.0_f32, f32::max);
            self.points[i].gait.bump = bump;
        }
    }
}
