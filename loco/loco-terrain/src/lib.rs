//! Terrain implementations for the locomotion stack.
//!
//! Provides concrete [`Terrain`](loco_types::Terrain) collaborators for hosts
//! without a physics engine, and for tests:
//!
//! - [`FlatGround`] - Infinite horizontal plane
//! - [`HeightField`] - Bilinear height grid with ray marching
//! - [`BoxObstacle`] - Axis-aligned box that blocks rays
//! - [`TerrainScene`] - Ground plus obstacles
//!
//! Height queries see only the ground. Ray casts see everything, which is
//! what the auto-wall probe needs to detect ledges and crates.
//!
//! # Example
//!
//! ```
//! use loco_terrain::{HeightField, TerrainScene};
//! use loco_types::Terrain;
//!
//! let hills = HeightField::from_fn(65, 65, 0.5, |x, z| 0.2 * (x * 0.3).sin() + 0.1 * z)
//!     .unwrap()
//!     .with_origin(-16.0, -16.0);
//! let scene = TerrainScene::new(hills);
//!
//! assert!(scene.ground_height(0.0, 0.0).is_some());
//! assert!(scene.ground_height(40.0, 0.0).is_none());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod error;
mod heightfield;
pub mod raycast;
mod scene;

pub use error::TerrainError;
pub use heightfield::HeightField;
pub use scene::{BoxObstacle, FlatGround, Ground, TerrainScene};
