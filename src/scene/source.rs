//! Capability traits at the host boundary.
//!
//! The core never sees host scene types; the host adapts its scene graph
//! to these records when asked. Identity newtypes keep cache keys opaque
//! (the host picks whatever stable ids it has — pointers, session ids,
//! slot indices).

use glam::{Mat4, Vec3};

use crate::keypoint::BoneBinding;

/// Opaque identity of a scene, used for cache keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(pub u64);

/// Opaque identity of a view layer (visibility-filter context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewLayerId(pub u64);

/// Posed head/tail positions of one bone, in armature space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    /// Bone head position.
    pub head: Vec3,
    /// Bone tail position.
    pub tail: Vec3,
}

/// One bone as reported by the host for a single collection pass.
#[derive(Debug, Clone)]
pub struct BoneSnapshot {
    /// Keypoint bindings authored on this bone.
    pub binding: BoneBinding,
    /// Posed transform, or `None` when the pose counterpart is missing
    /// (malformed hierarchy — the bone is skipped, not an error).
    pub pose: Option<BonePose>,
}

/// One armature object as reported by the host for a single collection
/// pass.
#[derive(Debug, Clone)]
pub struct ArmatureSnapshot {
    /// Object-to-world transform.
    pub world_matrix: Mat4,
    /// Bones in the host's enumeration order. Order is observable:
    /// later bones win body-index collisions.
    pub bones: Vec<BoneSnapshot>,
}

/// Scene-graph query boundary.
///
/// Implementations enumerate the armature objects of a scene that are
/// visible under a view layer, snapshotting exactly the data one
/// collection pass needs. The snapshot is a pure read; the collector
/// never mutates host state through this trait.
pub trait SceneSource {
    /// Armature objects of `scene` visible under `view_layer`, in the
    /// host's enumeration order.
    fn visible_armatures(
        &self,
        scene: SceneId,
        view_layer: ViewLayerId,
    ) -> Vec<ArmatureSnapshot>;
}

/// Outward notification boundary.
///
/// The cache asks the host to redraw its 3D viewports after every
/// refresh so a recollected pose scene becomes visible without waiting
/// for unrelated input.
pub trait FrameSink {
    /// Tag all currently visible 3D viewports for redraw.
    fn request_redraw(&self);
}
