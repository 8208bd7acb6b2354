//! Raw hand-joint snapshot handed to direct shape validators.

use crate::types::Position;

/// Hand joints in XR_EXT_hand_tracking order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HandJoint {
    Palm,
    Wrist,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    MiddleTip,
    RingMetacarpal,
    RingProximal,
    RingIntermediate,
    RingDistal,
    RingTip,
    LittleMetacarpal,
    LittleProximal,
    LittleIntermediate,
    LittleDistal,
    LittleTip,
}

pub const HAND_JOINT_COUNT: usize = 26;

impl HandJoint {
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandJoints {
    pub positions: [Position; HAND_JOINT_COUNT],
    pub timestamp: f64,
}

impl HandJoints {
    pub fn new(positions: [Position; HAND_JOINT_COUNT], timestamp: f64) -> Self {
        Self {
            positions,
            timestamp,
        }
    }

    pub fn position(&self, joint: HandJoint) -> Position {
        self.positions[joint.index()]
    }

    pub fn distance(&self, a: HandJoint, b: HandJoint) -> f32 {
        nalgebra::distance(&self.position(a), &self.position(b))
    }
}
