//! Body height compensation for foot placement.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::FootCorrectionRegistry;

/// Vertical offset applied to the rendered body so planted feet reach the
/// ground.
///
/// The offset is `initial - average / 2`, where `average` is the registry's
/// smoothed foot correction. Halving keeps the legs from lifting too far
/// when only one foot is planted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyHeightOffset {
    /// Offset with no foot correction.
    pub initial: f32,
}

impl BodyHeightOffset {
    /// Offset starting from `initial`.
    #[must_use]
    pub const fn new(initial: f32) -> Self {
        Self { initial }
    }

    /// Current offset.
    #[must_use]
    pub fn offset(&self, registry: &FootCorrectionRegistry) -> f32 {
        self.initial - registry.average() / 2.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_offset_tracks_average() {
        let mut registry = FootCorrectionRegistry::new().with_smoothing(0.0);
        let body = BodyHeightOffset::new(0.1);
        assert_eq!(body.offset(&registry), 0.1);

        let foot = registry.register();
        registry.report(foot, 0.4).unwrap();
        assert_relative_eq!(body.offset(&registry), -0.1, epsilon = 1e-6);
    }
}
