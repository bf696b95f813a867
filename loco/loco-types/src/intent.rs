//! High-level movement intent.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Movement request for one frame.
///
/// `direction` is a stick-style 2D input `(x, y)` expressed relative to the
/// coordinate basis `basis`, itself a ground-plane forward vector `(x, z)`.
/// With the default basis `(0, 1)` the input maps directly to world `(x, z)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovementIntent {
    /// Forward vector of the input basis on the ground plane.
    pub basis: Vector2<f32>,
    /// Desired movement, `x` to the right of the basis and `y` along it.
    pub direction: Vector2<f32>,
    /// Sprint amount in `[0, 1]`.
    pub sprint: f32,
    /// Strafe amount in `[0, 1]`. At 1 the character keeps facing the basis.
    pub strafe: f32,
}

impl Default for MovementIntent {
    fn default() -> Self {
        Self::idle()
    }
}

impl MovementIntent {
    /// No movement.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            basis: Vector2::y(),
            direction: Vector2::zeros(),
            sprint: 0.0,
            strafe: 0.0,
        }
    }

    /// Move along +Z at walking pace.
    #[must_use]
    pub fn forward() -> Self {
        Self::new(Vector2::y())
    }

    /// Move in `direction`, relative to the default basis.
    #[must_use]
    pub fn new(direction: Vector2<f32>) -> Self {
        Self {
            direction,
            ..Self::idle()
        }
    }

    /// Set the input basis.
    #[must_use]
    pub fn basis(mut self, basis: Vector2<f32>) -> Self {
        self.basis = basis;
        self
    }

    /// Set the sprint amount.
    #[must_use]
    pub fn sprint(mut self, sprint: f32) -> Self {
        self.sprint = sprint;
        self
    }

    /// Set the strafe amount.
    #[must_use]
    pub fn strafe(mut self, strafe: f32) -> Self {
        self.strafe = strafe;
        self
    }

    /// Whether the intent requests no movement.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.direction.norm_squared() == 0.0
    }
}
