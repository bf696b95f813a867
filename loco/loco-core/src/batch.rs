//! Batched characters: N independent controllers sharing one engine.
//!
//! Every character evaluates the same [`InferenceEngine`], but keeps its own
//! trajectory, skeleton, phase and scratch buffers. Stepping is parallelized
//! across CPU cores via rayon when the `parallel` feature is enabled, with a
//! sequential fallback otherwise.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use loco_core::CharacterBatch;
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
//! let engine = Arc::new(InferenceEngine::zeros(NetworkConfig::with_sizes(342, 311, 16)).unwrap());
//! let mut batch = CharacterBatch::new(engine, LocomotionConfig::default(), 8).unwrap();
//!
//! let intents = vec![MovementIntent::forward(); batch.len()];
//! let errors = batch.advance_all(&intents, 1.0 / 60.0, &Flat);
//! assert!(errors.iter().all(Option::is_none));
//! ```

use std::sync::Arc;

use loco_nn::InferenceEngine;
use loco_types::{LocomotionConfig, MovementIntent, Terrain};
use nalgebra::Vector3;

use crate::{ControllerError, Result, TrajectoryController};

/// N independent characters sharing one [`InferenceEngine`].
///
/// # Determinism
///
/// Each character's frame is a pure function of its own controller, its
/// intent, the shared engine and the terrain. Results do not depend on
/// thread count or scheduling.
#[derive(Debug, Clone)]
pub struct CharacterBatch {
    engine: Arc<InferenceEngine>,
    characters: Vec<TrajectoryController>,
}

impl CharacterBatch {
    /// Create `n` characters standing at the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or does not match
    /// the engine's layer sizes.
    pub fn new(engine: Arc<InferenceEngine>, config: LocomotionConfig, n: usize) -> Result<Self> {
        let prototype = TrajectoryController::new(Arc::clone(&engine), config)?;
        let characters = vec![prototype; n];
        Ok(Self { engine, characters })
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Shared engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<InferenceEngine> {
        &self.engine
    }

    // ==================== Character Access ====================

    /// Character `i`, or `None` if out of range.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&TrajectoryController> {
        self.characters.get(i)
    }

    /// Mutable character `i`, or `None` if out of range.
    pub fn get_mut(&mut self, i: usize) -> Option<&mut TrajectoryController> {
        self.characters.get_mut(i)
    }

    /// Iterator over all characters.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TrajectoryController> {
        self.characters.iter()
    }

    /// Mutable iterator over all characters.
    ///
    /// Use this to add walls or set crouch targets before
    /// [`advance_all`](Self::advance_all).
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = &mut TrajectoryController> {
        self.characters.iter_mut()
    }

    // ==================== Stepping ====================

    /// Advance every character by one frame.
    ///
    /// Character `i` uses `intents[i]`; characters without an intent (when
    /// `intents` is shorter than the batch) stay idle. Returns per-character
    /// errors: `None` on success, `Some(e)` if that character's frame failed.
    /// A failure does not affect other characters.
    pub fn advance_all<T: Terrain + Sync + ?Sized>(
        &mut self,
        intents: &[MovementIntent],
        dt: f32,
        terrain: &T,
    ) -> Vec<Option<ControllerError>> {
        let idle = MovementIntent::idle();
        let frame = |(i, character): (usize, &mut TrajectoryController)| {
            let intent = intents.get(i).unwrap_or(&idle);
            character.advance(intent, dt, terrain).err()
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};
            self.characters.par_iter_mut().enumerate().map(frame).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.characters.iter_mut().enumerate().map(frame).collect()
        }
    }

    // ==================== Reset ====================

    /// Place character `i` at a scene-space position.
    ///
    /// Returns `None` if `i` is out of range.
    pub fn reset<T: Terrain + ?Sized>(
        &mut self,
        i: usize,
        position: Vector3<f32>,
        terrain: &T,
    ) -> Option<Result<()>> {
        Some(self.characters.get_mut(i)?.reset(position, terrain))
    }

    /// Reset every character where `mask[i]` is true to the origin.
    ///
    /// Characters past the end of `mask` are untouched.
    pub fn reset_where<T: Terrain + ?Sized>(&mut self, mask: &[bool], terrain: &T) -> Result<()> {
        for (character, _) in self
            .characters
            .iter_mut()
            .zip(mask)
            .filter(|(_, reset)| **reset)
        {
            character.reset(Vector3::zeros(), terrain)?;
        }
        Ok(())
    }

    /// Reset every character to the origin.
    pub fn reset_all<T: Terrain + ?Sized>(&mut self, terrain: &T) -> Result<()> {
        for character in &mut self.characters {
            character.reset(Vector3::zeros(), terrain)?;
        }
        Ok(())
    }
}
