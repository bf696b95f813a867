//! Core types for phase-functioned character locomotion.
//!
//! This crate provides the shared vocabulary of the locomotion stack:
//!
//! - [`JointId`] / [`Joint`] - The fixed 31-joint skeleton and per-joint state
//! - [`TrajectoryPoint`] / [`GaitWeights`] - Samples of the rolling trajectory window
//! - [`WallSegment`] - 2D obstacle segments the trajectory is pushed away from
//! - [`MovementIntent`] - High-level movement input for one frame
//! - [`LocomotionConfig`] - Trajectory, wall and smoothing parameters
//! - [`Terrain`] - Ground-height and raycast queries supplied by the host
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They carry no inference, no trajectory
//! prediction and no foot placement. They are the common language between:
//!
//! - The neural inference engine (`loco-nn`)
//! - The trajectory controller (`loco-core`)
//! - Foot placement post-processing (`loco-ik`)
//! - Terrain providers (`loco-terrain`, or a host physics engine)
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in
//! headless tools, tests, and any engine that can answer [`Terrain`] queries.
//!
//! # Coordinate System
//!
//! Locomotion data follows the convention of the trained networks:
//!
//! - X: right
//! - Y: up
//! - Z: forward
//!
//! Headings are yaw angles about +Y, measured from +Z toward +X, so a heading
//! of zero faces +Z. Two spaces are in play: **network space**, where the
//! trajectory and joints live, and **scene space**, which is network space
//! multiplied by [`LocomotionConfig::scale_factor`]. Walls and terrain queries
//! are expressed in scene space.
//!
//! # Example
//!
//! ```
//! use loco_types::{JointId, WallSegment};
//! use nalgebra::Vector2;
//!
//! assert_eq!(JointId::LeftFoot.parent(), Some(JointId::LeftLeg));
//!
//! let wall = WallSegment::new(Vector2::new(-1.0, 2.0), Vector2::new(1.0, 2.0)).unwrap();
//! let nearest = wall.nearest_point(Vector2::new(0.0, 0.0));
//! assert!((nearest - Vector2::new(0.0, 2.0)).norm() < 1e-6);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

mod config;
mod error;
mod intent;
mod joint;
mod terrain;
mod trajectory;
mod wall;

pub use config::{LocomotionConfig, SmoothingConfig};
pub use error::LocoError;
pub use intent::MovementIntent;
pub use joint::{JOINT_COUNT, Joint, JointId};
pub use terrain::{RaycastHit, Terrain};
pub use trajectory::{GAIT_SNAP_EPSILON, GaitWeights, TrajectoryPoint};
pub use wall::WallSegment;

// Re-export math types for convenience
pub use nalgebra::{UnitQuaternion, Vector2, Vector3};

/// Result type for locomotion data operations.
pub type Result<T> = std::result::Result<T, LocoError>;
