//! Foot-ground projection for phase-functioned character locomotion.
//!
//! The network's feet float or clip on uneven ground. This crate corrects
//! them after each frame:
//!
//! - [`FootGroundProjector`] - Blends one animated ankle toward a pose on the
//!   ground, weighted by the gait phase
//! - [`FootCorrectionRegistry`] - Running average of how far feet were moved,
//!   shared by every foot in a scene
//! - [`BodyHeightOffset`] - Turns that average into a body height offset
//! - [`FootConfig`] - Joints, heel height and lift-off phase of a foot
//!
//! All poses are in scene space.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use loco_core::TrajectoryController;
//! use loco_ik::{BodyHeightOffset, FootConfig, FootCorrectionRegistry, FootGroundProjector};
//! use loco_nn::{InferenceEngine, NetworkConfig};
//! use loco_terrain::FlatGround;
//! use loco_types::LocomotionConfig;
//!
//! let engine = Arc::new(InferenceEngine::zeros(NetworkConfig::with_sizes(342, 311, 16)).unwrap());
//! let character = TrajectoryController::new(engine, LocomotionConfig::default()).unwrap();
//! let ground = FlatGround::new(0.0);
//!
//! let mut registry = FootCorrectionRegistry::new();
//! let left = FootGroundProjector::new(FootConfig::left(), &mut registry).unwrap();
//! let right = FootGroundProjector::new(FootConfig::right(), &mut registry).unwrap();
//!
//! let left_pose = left.update(&character, &ground, &mut registry).unwrap();
//! let right_pose = right.update(&character, &ground, &mut registry).unwrap();
//! assert!(left_pose.position.y >= 0.0 && right_pose.position.y >= 0.0);
//!
//! let body = BodyHeightOffset::new(0.0);
//! let _ = body.offset(&registry);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod config;
mod error;
mod offset;
mod projector;
mod registry;

pub use config::FootConfig;
pub use error::IkError;
pub use offset::BodyHeightOffset;
pub use projector::{FootGroundProjector, FootPose, ik_weight};
pub use registry::{DEFAULT_AVERAGE_SMOOTHING, FootCorrectionRegistry, FootHandle};

/// Result type for foot placement.
pub type Result<T> = std::result::Result<T, IkError>;
