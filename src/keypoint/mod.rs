//! Anatomical keypoint name tables and per-bone binding records.
//!
//! The tables are fixed and immutable: 18 body slots and 21 hand-joint
//! slots, matching the OpenPose annotator conventions the downstream
//! pipeline expects. Face points are an unordered list and carry no
//! index.

mod binding;

pub use binding::{BodyBinding, BoneBinding, FaceBinding, HandBinding};

use serde::{Deserialize, Serialize};

/// The fixed 18-slot body keypoint table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[allow(missing_docs)] // variant names are the documentation
pub enum BodyKeypoint {
    Nose,
    Neck,
    RShoulder,
    RElbow,
    RWrist,
    LShoulder,
    LElbow,
    LWrist,
    RHip,
    RKnee,
    RAnkle,
    LHip,
    LKnee,
    LAnkle,
    REye,
    LEye,
    REar,
    LEar,
}

impl BodyKeypoint {
    /// Number of body keypoint slots.
    pub const COUNT: usize = 18;

    /// All slots in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nose,
        Self::Neck,
        Self::RShoulder,
        Self::RElbow,
        Self::RWrist,
        Self::LShoulder,
        Self::LElbow,
        Self::LWrist,
        Self::RHip,
        Self::RKnee,
        Self::RAnkle,
        Self::LHip,
        Self::LKnee,
        Self::LAnkle,
        Self::REye,
        Self::LEye,
        Self::REar,
        Self::LEar,
    ];

    /// Slot for a raw table index, or `None` when out of range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Raw table index of this slot.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display name of this slot.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "Nose",
            Self::Neck => "Neck",
            Self::RShoulder => "RShoulder",
            Self::RElbow => "RElbow",
            Self::RWrist => "RWrist",
            Self::LShoulder => "LShoulder",
            Self::LElbow => "LElbow",
            Self::LWrist => "LWrist",
            Self::RHip => "RHip",
            Self::RKnee => "RKnee",
            Self::RAnkle => "RAnkle",
            Self::LHip => "LHip",
            Self::LKnee => "LKnee",
            Self::LAnkle => "LAnkle",
            Self::REye => "REye",
            Self::LEye => "LEye",
            Self::REar => "REar",
            Self::LEar => "LEar",
        }
    }
}

/// The fixed 21-slot hand joint table: the wrist root plus five fingers
/// with four joints each, knuckle to tip.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[allow(missing_docs)] // variant names are the documentation
pub enum HandJoint {
    Root,
    Thumb1,
    Thumb2,
    Thumb3,
    Thumb4,
    Index1,
    Index2,
    Index3,
    Index4,
    Middle1,
    Middle2,
    Middle3,
    Middle4,
    Ring1,
    Ring2,
    Ring3,
    Ring4,
    Pinky1,
    Pinky2,
    Pinky3,
    Pinky4,
}

impl HandJoint {
    /// Number of hand joint slots.
    pub const COUNT: usize = 21;

    /// All slots in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Root,
        Self::Thumb1,
        Self::Thumb2,
        Self::Thumb3,
        Self::Thumb4,
        Self::Index1,
        Self::Index2,
        Self::Index3,
        Self::Index4,
        Self::Middle1,
        Self::Middle2,
        Self::Middle3,
        Self::Middle4,
        Self::Ring1,
        Self::Ring2,
        Self::Ring3,
        Self::Ring4,
        Self::Pinky1,
        Self::Pinky2,
        Self::Pinky3,
        Self::Pinky4,
    ];

    /// Slot for a raw table index, or `None` when out of range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Raw table index of this slot.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label, e.g. `"Thumb 2"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Thumb1 => "Thumb 1",
            Self::Thumb2 => "Thumb 2",
            Self::Thumb3 => "Thumb 3",
            Self::Thumb4 => "Thumb 4",
            Self::Index1 => "Index 1",
            Self::Index2 => "Index 2",
            Self::Index3 => "Index 3",
            Self::Index4 => "Index 4",
            Self::Middle1 => "Middle 1",
            Self::Middle2 => "Middle 2",
            Self::Middle3 => "Middle 3",
            Self::Middle4 => "Middle 4",
            Self::Ring1 => "Ring 1",
            Self::Ring2 => "Ring 2",
            Self::Ring3 => "Ring 3",
            Self::Ring4 => "Ring 4",
            Self::Pinky1 => "Pinky 1",
            Self::Pinky2 => "Pinky 2",
            Self::Pinky3 => "Pinky 3",
            Self::Pinky4 => "Pinky 4",
        }
    }
}
