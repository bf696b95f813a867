//! Scene-wide aggregation of foot height corrections.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{IkError, Result};

/// Default weight of the previous average in the running mean.
pub const DEFAULT_AVERAGE_SMOOTHING: f32 = 0.9;

/// Identifier of a foot registered with a [`FootCorrectionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FootHandle(u64);

impl FootHandle {
    /// Returns the underlying ID value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FootHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Foot({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct FootEntry {
    enabled: bool,
    correction: f32,
}

/// Running average of how far foot placement moves feet vertically.
///
/// Every foot reports its latest correction (animated ankle height minus
/// placed ankle height). After each report the average is updated as
///
/// ```text
/// average <- a * average + (1 - a) * mean(latest corrections of enabled feet)
/// ```
///
/// with `a` = [`DEFAULT_AVERAGE_SMOOTHING`] unless configured otherwise.
/// Hosts use the average to lower or raise the body so that planted feet
/// reach the ground (see [`BodyHeightOffset`](crate::BodyHeightOffset)).
///
/// # Example
///
/// ```
/// use loco_ik::FootCorrectionRegistry;
///
/// let mut registry = FootCorrectionRegistry::new();
/// let left = registry.register();
/// let right = registry.register();
///
/// registry.report(left, 0.2).unwrap();
/// registry.report(right, 0.2).unwrap();
/// assert!(registry.average() > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FootCorrectionRegistry {
    feet: BTreeMap<FootHandle, FootEntry>,
    next_id: u64,
    average: f32,
    smoothing: f32,
}

impl Default for FootCorrectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FootCorrectionRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            feet: BTreeMap::new(),
            next_id: 0,
            average: 0.0,
            smoothing: DEFAULT_AVERAGE_SMOOTHING,
        }
    }

    /// Set the weight of the previous average, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 1.0);
        self
    }

    /// Register an enabled foot with a zero correction.
    pub fn register(&mut self) -> FootHandle {
        let handle = FootHandle(self.next_id);
        self.next_id += 1;
        self.feet.insert(
            handle,
            FootEntry {
                enabled: true,
                correction: 0.0,
            },
        );
        debug!(%handle, feet = self.feet.len(), "foot registered");
        handle
    }

    /// Remove a foot. Its handle is never reused.
    pub fn unregister(&mut self, handle: FootHandle) -> Result<()> {
        self.feet
            .remove(&handle)
            .map(|_| debug!(%handle, feet = self.feet.len(), "foot unregistered"))
            .ok_or(IkError::UnknownFoot(handle))
    }

    /// Include or exclude a foot from the average.
    pub fn set_enabled(&mut self, handle: FootHandle, enabled: bool) -> Result<()> {
        let entry = self.entry_mut(handle)?;
        entry.enabled = enabled;
        Ok(())
    }

    /// Whether a foot is registered and enabled.
    #[must_use]
    pub fn is_enabled(&self, handle: FootHandle) -> bool {
        self.feet.get(&handle).is_some_and(|e| e.enabled)
    }

    /// Record a foot's latest correction and update the average.
    ///
    /// Reports from a disabled foot are stored but leave the average
    /// untouched. Returns the updated average.
    pub fn report(&mut self, handle: FootHandle, correction: f32) -> Result<f32> {
        let entry = self.entry_mut(handle)?;
        entry.correction = correction;
        if !entry.enabled {
            return Ok(self.average);
        }

        let (sum, count) = self
            .feet
            .values()
            .filter(|e| e.enabled)
            .fold((0.0_f32, 0_u32), |(sum, n), e| (sum + e.correction, n + 1));
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / count as f32;

        self.average = self.smoothing * self.average + (1.0 - self.smoothing) * mean;
        Ok(self.average)
    }

    /// Latest correction reported by a foot.
    #[must_use]
    pub fn correction(&self, handle: FootHandle) -> Option<f32> {
        self.feet.get(&handle).map(|e| e.correction)
    }

    /// Smoothed average correction.
    #[must_use]
    pub fn average(&self) -> f32 {
        self.average
    }

    /// Number of registered feet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.feet.len()
    }

    /// Whether no feet are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.feet.is_empty()
    }

    /// Number of enabled feet.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.feet.values().filter(|e| e.enabled).count()
    }

    /// Zero the average and every stored correction.
    pub fn reset(&mut self) {
        self.average = 0.0;
        for entry in self.feet.values_mut() {
            entry.correction = 0.0;
        }
    }

    fn entry_mut(&mut self, handle: FootHandle) -> Result<&mut FootEntry> {
        self.feet.get_mut(&handle).ok_or(IkError::UnknownFoot(handle))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_running_mean() {
        let mut registry = FootCorrectionRegistry::new();
        let left = registry.register();
        let right = registry.register();

        registry.report(left, 1.0).unwrap();
        // mean(1, 0) = 0.5
        assert_relative_eq!(registry.average(), 0.05, epsilon = 1e-6);

        registry.report(right, 1.0).unwrap();
        // 0.9 * 0.05 + 0.1 * 1
        assert_relative_eq!(registry.average(), 0.145, epsilon = 1e-6);
    }

    #[test]
    fn test_converges_to_constant_correction() {
        let mut registry = FootCorrectionRegistry::new();
        let feet = [registry.register(), registry.register()];
        for _ in 0..200 {
            for &foot in &feet {
                registry.report(foot, 0.3).unwrap();
            }
        }
        assert_relative_eq!(registry.average(), 0.3, epsilon = 1e-4);
    }

    #[test]
    fn test_disabled_feet_excluded() {
        let mut registry = FootCorrectionRegistry::new().with_smoothing(0.0);
        let a = registry.register();
        let b = registry.register();
        registry.report(b, 10.0).unwrap();
        registry.set_enabled(b, false).unwrap();
        assert!(!registry.is_enabled(b));
        assert_eq!(registry.enabled_count(), 1);

        assert_eq!(registry.report(a, 2.0).unwrap(), 2.0);

        // A disabled foot's report is kept but does not move the average.
        assert_eq!(registry.report(b, 50.0).unwrap(), 2.0);
        assert_eq!(registry.correction(b), Some(50.0));
    }

    #[test]
    fn test_unknown_handles() {
        let mut registry = FootCorrectionRegistry::new();
        let foot = registry.register();
        registry.unregister(foot).unwrap();
        assert!(registry.is_empty());

        assert_eq!(registry.report(foot, 1.0), Err(IkError::UnknownFoot(foot)));
        assert!(registry.unregister(foot).is_err());
        assert!(registry.set_enabled(foot, true).is_err());

        // Handles are not reused.
        let next = registry.register();
        assert_ne!(next, foot);
        assert_eq!(next.to_string(), "Foot(1)");
    }

    #[test]
    fn test_reset() {
        let mut registry = FootCorrectionRegistry::new();
        let foot = registry.register();
        registry.report(foot, 1.0).unwrap();
        registry.reset();
        assert_eq!(registry.average(), 0.0);
        assert_eq!(registry.correction(foot), Some(0.0));
        assert_eq!(registry.len(), 1);
    }
}
