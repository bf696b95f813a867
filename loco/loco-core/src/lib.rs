//! Trajectory control for phase-functioned character locomotion.
//!
//! This crate turns movement intent into skeletal motion:
//!
//! - [`TrajectoryController`] - Rolling trajectory window, gait smoothing,
//!   wall avoidance, and the network encode/decode loop for one character
//! - [`NetworkLayout`] - Offsets into the network input and output vectors
//! - [`WaypointFollower`] - Intent source that loops through waypoints
//! - [`CharacterBatch`] - Many characters sharing one engine, optionally
//!   stepped in parallel
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use loco_core::TrajectoryController;
//! use loco_nn::{InferenceEngine, NetworkConfig};
//! use loco_types::{LocomotionConfig, MovementIntent, RaycastHit, Terrain};
//! use nalgebra::Vector3;
//!
//! struct Flat;
//!
//! impl Terrain for Flat {
//!     fn ground_height(&self, _x: f32, _z: f32) -> Option<f32> {
//!         Some(0.0)
//!     }
//!     fn raycast(&self, _o: Vector3<f32>, _d: Vector3<f32>, _m: f32) -> Option<RaycastHit> {
//!         None
//!     }
//! }
//!
//! let engine = Arc::new(InferenceEngine::zeros(NetworkConfig::with_sizes(342, 311, 32)).unwrap());
//! let mut character = TrajectoryController::new(engine, LocomotionConfig::default()).unwrap();
//! character.reset(Vector3::zeros(), &Flat).unwrap();
//!
//! for _ in 0..10 {
//!     character.advance(&MovementIntent::forward(), 1.0 / 60.0, &Flat).unwrap();
//! }
//! assert!(character.target_velocity().z > 0.0);
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `parallel` | Step [`CharacterBatch`] characters with rayon |
//! | `serde` | Serialize configuration and frame reports |

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::many_single_char_names
)]

mod batch;
pub mod controller;
mod error;
mod layout;
pub mod math;
mod waypoint;

pub use batch::CharacterBatch;
pub use controller::{AutoWall, FrameReport, TrajectoryController};
pub use error::ControllerError;
pub use layout::NetworkLayout;
pub use waypoint::{DEFAULT_ARRIVAL_RADIUS, WaypointFollower};

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;
