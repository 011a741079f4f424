//! Per-bone keypoint binding records.
//!
//! A binding associates a bone, at a fractional offset along its
//! head-to-tail segment, with one keypoint slot. Binding data is owned
//! by the host's skeleton objects and persists with the scene; this
//! crate only defines the records and their validation.

use serde::{Deserialize, Serialize};

use super::{BodyKeypoint, HandJoint};

/// Clamp an interpolation offset into `[0, 1]`.
///
/// Non-finite values collapse to `0.0` so a corrupt offset can never
/// escape the valid range.
fn clamp_offset(offset: f32) -> f32 {
    if offset.is_finite() {
        offset.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Binds a bone position to one of the 18 body keypoint slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyBinding {
    /// Target body slot.
    pub index: BodyKeypoint,
    /// Interpolation offset along the bone, in `[0, 1]`.
    pub offset: f32,
}

impl BodyBinding {
    /// New body binding with the offset clamped into `[0, 1]`.
    #[must_use]
    pub fn new(index: BodyKeypoint, offset: f32) -> Self {
        Self {
            index,
            offset: clamp_offset(offset),
        }
    }
}

/// Binds a bone position to a joint of one hand instance.
///
/// `group` identifies which hand the joint belongs to; bindings with the
/// same group on the same object merge into a single hand, regardless of
/// which bones contribute them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandBinding {
    /// Hand instance identifier.
    pub group: u32,
    /// Target hand joint slot.
    pub index: HandJoint,
    /// Interpolation offset along the bone, in `[0, 1]`.
    pub offset: f32,
}

impl HandBinding {
    /// New hand binding with the offset clamped into `[0, 1]`.
    #[must_use]
    pub fn new(group: u32, index: HandJoint, offset: f32) -> Self {
        Self {
            group,
            index,
            offset: clamp_offset(offset),
        }
    }
}

/// Binds a bone position to an unindexed face point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBinding {
    /// Interpolation offset along the bone, in `[0, 1]`.
    pub offset: f32,
}

impl FaceBinding {
    /// New face binding with the offset clamped into `[0, 1]`.
    #[must_use]
    pub fn new(offset: f32) -> Self {
        Self {
            offset: clamp_offset(offset),
        }
    }
}

/// All keypoint bindings attached to a single bone.
///
/// A bone may hold any number of bindings across all three kinds
/// simultaneously.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneBinding {
    /// Body keypoint bindings.
    #[serde(default)]
    pub body: Vec<BodyBinding>,
    /// Hand joint bindings.
    #[serde(default)]
    pub hands: Vec<HandBinding>,
    /// Face point bindings.
    #[serde(default)]
    pub faces: Vec<FaceBinding>,
}

impl BoneBinding {
    /// Empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the bone carries no bindings of any kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.hands.is_empty() && self.faces.is_empty()
    }

    /// Append a body binding, returning its list index.
    pub fn add_body(&mut self, binding: BodyBinding) -> usize {
        self.body.push(binding);
        self.body.len() - 1
    }

    /// Append a hand binding, returning its list index.
    pub fn add_hand(&mut self, binding: HandBinding) -> usize {
        self.hands.push(binding);
        self.hands.len() - 1
    }

    /// Append a face binding, returning its list index.
    pub fn add_face(&mut self, binding: FaceBinding) -> usize {
        self.faces.push(binding);
        self.faces.len() - 1
    }

    /// Remove the body binding at `index`, or `None` when out of range.
    pub fn remove_body(&mut self, index: usize) -> Option<BodyBinding> {
        (index < self.body.len()).then(|| self.body.remove(index))
    }

    /// Remove the hand binding at `index`, or `None` when out of range.
    pub fn remove_hand(&mut self, index: usize) -> Option<HandBinding> {
        (index < self.hands.len()).then(|| self.hands.remove(index))
    }

    /// Remove the face binding at `index`, or `None` when out of range.
    pub fn remove_face(&mut self, index: usize) -> Option<FaceBinding> {
        (index < self.faces.len()).then(|| self.faces.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_clamp_into_unit_range() {
        assert_eq!(BodyBinding::new(BodyKeypoint::Nose, -0.5).offset, 0.0);
        assert_eq!(BodyBinding::new(BodyKeypoint::Nose, 1.5).offset, 1.0);
        assert_eq!(BodyBinding::new(BodyKeypoint::Nose, 0.25).offset, 0.25);
        assert_eq!(
            HandBinding::new(0, HandJoint::Root, f32::NAN).offset,
            0.0
        );
        assert_eq!(FaceBinding::new(f32::INFINITY).offset, 0.0);
    }

    #[test]
    fn bone_binding_edit_helpers() {
        let mut binding = BoneBinding::new();
        assert!(binding.is_empty());

        let i = binding.add_body(BodyBinding::new(BodyKeypoint::Neck, 0.5));
        assert_eq!(i, 0);
        let j = binding.add_hand(HandBinding::new(2, HandJoint::Thumb1, 1.0));
        assert_eq!(j, 0);
        let _ = binding.add_face(FaceBinding::new(0.0));
        assert!(!binding.is_empty());

        let removed = binding.remove_body(0);
        assert_eq!(
            removed,
            Some(BodyBinding::new(BodyKeypoint::Neck, 0.5))
        );
        assert_eq!(binding.remove_body(0), None);
        assert_eq!(binding.remove_hand(5), None);
        assert!(binding.remove_face(0).is_some());
    }

    #[test]
    fn bindings_round_trip_through_serde() {
        let mut binding = BoneBinding::new();
        let _ = binding.add_body(BodyBinding::new(BodyKeypoint::LWrist, 0.75));
        let _ = binding.add_hand(HandBinding::new(1, HandJoint::Index3, 0.5));

        let json = serde_json::to_string(&binding).unwrap();
        let parsed: BoneBinding = serde_json::from_str(&json).unwrap();
        assert_eq!(binding, parsed);
    }

    #[test]
    fn partial_serde_fills_empty_lists() {
        let parsed: BoneBinding = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }
}
