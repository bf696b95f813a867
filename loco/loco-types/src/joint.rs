//! Skeleton topology and per-joint state.
//!
//! The skeleton is a fixed 31-joint hierarchy. Joints are stored in a flat
//! array indexed by [`JointId`], and parent links are plain indices into the
//! same array.

use nalgebra::{UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::LocoError;

/// Number of joints in the skeleton.
pub const JOINT_COUNT: usize = 31;

/// Identifier of one joint of the fixed skeleton.
///
/// The discriminant is the joint's index in every per-joint array, including
/// the network's input and output vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum JointId {
    Hips = 0,
    RightHipJoint,
    RightUpLeg,
    RightLeg,
    RightFoot,
    RightToeBase,
    LeftHipJoint,
    LeftUpLeg,
    LeftLeg,
    LeftFoot,
    LeftToeBase,
    LowerBack,
    Spine,
    Spine1,
    Neck,
    Neck1,
    Head,
    RightShoulder,
    RightArm,
    RightForeArm,
    RightHand,
    RightFingerBase,
    RightHandIndex1,
    RightThumb,
    LeftShoulder,
    LeftArm,
    LeftForeArm,
    LeftHand,
    LeftFingerBase,
    LeftHandIndex1,
    LeftThumb,
}

/// Parent index of every joint, `None` for the root.
const PARENTS: [Option<u8>; JOINT_COUNT] = [
    None,     // Hips
    Some(0),  // RightHipJoint
    Some(1),  // RightUpLeg
    Some(2),  // RightLeg
    Some(3),  // RightFoot
    Some(4),  // RightToeBase
    Some(0),  // LeftHipJoint
    Some(6),  // LeftUpLeg
    Some(7),  // LeftLeg
    Some(8),  // LeftFoot
    Some(9),  // LeftToeBase
    Some(0),  // LowerBack
    Some(11), // Spine
    Some(12), // Spine1
    Some(13), // Neck
    Some(14), // Neck1
    Some(15), // Head
    Some(12), // RightShoulder
    Some(17), // RightArm
    Some(18), // RightForeArm
    Some(19), // RightHand
    Some(20), // RightFingerBase
    Some(21), // RightHandIndex1
    Some(22), // RightThumb
    Some(12), // LeftShoulder
    Some(24), // LeftArm
    Some(25), // LeftForeArm
    Some(26), // LeftHand
    Some(27), // LeftFingerBase
    Some(28), // LeftHandIndex1
    Some(29), // LeftThumb
];

impl JointId {
    /// Every joint, in index order.
    pub const ALL: [Self; JOINT_COUNT] = [
        Self::Hips,
        Self::RightHipJoint,
        Self::RightUpLeg,
        Self::RightLeg,
        Self::RightFoot,
        Self::RightToeBase,
        Self::LeftHipJoint,
        Self::LeftUpLeg,
        Self::LeftLeg,
        Self::LeftFoot,
        Self::LeftToeBase,
        Self::LowerBack,
        Self::Spine,
        Self::Spine1,
        Self::Neck,
        Self::Neck1,
        Self::Head,
        Self::RightShoulder,
        Self::RightArm,
        Self::RightForeArm,
        Self::RightHand,
        Self::RightFingerBase,
        Self::RightHandIndex1,
        Self::RightThumb,
        Self::LeftShoulder,
        Self::LeftArm,
        Self::LeftForeArm,
        Self::LeftHand,
        Self::LeftFingerBase,
        Self::LeftHandIndex1,
        Self::LeftThumb,
    ];

    /// Index of this joint in per-joint arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parent joint, or `None` for the root ([`JointId::Hips`]).
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match PARENTS[self as usize] {
            Some(p) => Some(Self::ALL[p as usize]),
            None => None,
        }
    }

    /// Whether this joint is the skeleton root.
    #[must_use]
    pub const fn is_root(self) -> bool {
        PARENTS[self as usize].is_none()
    }

    /// Iterator over this joint's ancestors, nearest first.
    pub fn ancestors(self) -> impl Iterator<Item = Self> {
        std::iter::successors(self.parent(), |j| j.parent())
    }
}

impl TryFrom<usize> for JointId {
    type Error = LocoError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(LocoError::InvalidJointIndex {
                index,
                count: JOINT_COUNT,
            })
    }
}

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// State of one joint, expressed in network space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Joint {
    /// Position.
    pub position: Vector3<f32>,
    /// Velocity, in network units per tick.
    pub velocity: Vector3<f32>,
    /// Orientation.
    pub rotation: UnitQuaternion<f32>,
}

impl Default for Joint {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

impl Joint {
    /// Create a joint at rest at the given position.
    #[must_use]
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Whether every component of the joint state is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.rotation.coords.iter().all(|v| v.is_finite())
    }
}
