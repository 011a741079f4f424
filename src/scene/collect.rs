//! Pose-scene collection: resolving bone bindings into world-space
//! keypoints.

use std::collections::BTreeMap;

use glam::Vec3;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use super::source::{ArmatureSnapshot, SceneId, SceneSource, ViewLayerId};
use crate::keypoint::{BodyKeypoint, HandJoint};

/// Sparse body keypoints of one skeleton instance: only bound slots are
/// present. Iteration order is slot order, keeping draws deterministic.
pub type BodyInstance = BTreeMap<BodyKeypoint, Vec3>;

/// Sparse joints of one hand instance.
pub type HandInstance = BTreeMap<HandJoint, Vec3>;

/// Ephemeral per-frame snapshot of every resolved keypoint world
/// position. Constructed fresh by [`collect`], read-only once built,
/// discarded after one draw pass (the viewport cache retains one
/// instance until invalidated).
#[derive(Debug, Clone, Default)]
pub struct PoseScene {
    /// One body instance per visible armature (possibly empty).
    pub bodies: Vec<BodyInstance>,
    /// One hand instance per distinct (object, group) pair, merged
    /// across the bones that contribute to it.
    pub hands: Vec<HandInstance>,
    /// One unordered face point list per visible armature (possibly
    /// empty).
    pub faces: Vec<Vec<Vec3>>,
}

impl PoseScene {
    /// `true` when no instance holds any point — nothing would draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.iter().all(BTreeMap::is_empty)
            && self.hands.is_empty()
            && self.faces.iter().all(Vec::is_empty)
    }

    /// Total number of resolved keypoints across all collections.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.bodies.iter().map(BTreeMap::len).sum::<usize>()
            + self.hands.iter().map(BTreeMap::len).sum::<usize>()
            + self.faces.iter().map(Vec::len).sum::<usize>()
    }
}

/// Collect the pose scene for `(scene, view_layer)`.
///
/// Walks every visible armature's bones and resolves each binding to
/// `world_matrix * lerp(head, tail, offset)`. Bones whose pose
/// counterpart is missing are skipped individually; the collection
/// itself never fails.
#[must_use]
pub fn collect(
    source: &dyn SceneSource,
    scene: SceneId,
    view_layer: ViewLayerId,
) -> PoseScene {
    let mut out = PoseScene::default();
    for armature in source.visible_armatures(scene, view_layer) {
        collect_armature(&armature, &mut out);
    }
    debug!(
        "collected pose scene: {} bodies, {} hands, {} faces ({} points)",
        out.bodies.len(),
        out.hands.len(),
        out.faces.len(),
        out.point_count()
    );
    out
}

fn collect_armature(armature: &ArmatureSnapshot, out: &mut PoseScene) {
    let mut body = BodyInstance::new();
    let mut face = Vec::new();
    let mut hands: FxHashMap<u32, HandInstance> = FxHashMap::default();

    for bone in &armature.bones {
        if bone.binding.is_empty() {
            continue;
        }
        let Some(pose) = bone.pose else {
            warn!("skipping bound bone without a pose counterpart");
            continue;
        };
        let resolve = |offset: f32| {
            armature
                .world_matrix
                .transform_point3(pose.head.lerp(pose.tail, offset))
        };

        for b in &bone.binding.body {
            // Last writer wins on index collision, matching the authoring
            // tool's overwrite semantics (see DESIGN.md open questions).
            if body.insert(b.index, resolve(b.offset)).is_some() {
                debug!("body slot {} rebound by a later bone", b.index.name());
            }
        }
        for h in &bone.binding.hands {
            let _ = hands
                .entry(h.group)
                .or_default()
                .insert(h.index, resolve(h.offset));
        }
        for f in &bone.binding.faces {
            face.push(resolve(f.offset));
        }
    }

    out.bodies.push(body);
    out.faces.push(face);

    // Hand instances in ascending group order: stable across collections,
    // which the deterministic capture path relies on.
    let mut groups: Vec<u32> = hands.keys().copied().collect();
    groups.sort_unstable();
    for group in groups {
        if let Some(instance) = hands.remove(&group) {
            out.hands.push(instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::keypoint::{
        BodyBinding, BoneBinding, FaceBinding, HandBinding,
    };
    use crate::scene::source::{BonePose, BoneSnapshot};

    struct FakeSource {
        armatures: Vec<ArmatureSnapshot>,
    }

    impl SceneSource for FakeSource {
        fn visible_armatures(
            &self,
            _scene: SceneId,
            _view_layer: ViewLayerId,
        ) -> Vec<ArmatureSnapshot> {
            self.armatures.clone()
        }
    }

    fn bone(binding: BoneBinding, head: Vec3, tail: Vec3) -> BoneSnapshot {
        BoneSnapshot {
            binding,
            pose: Some(BonePose { head, tail }),
        }
    }

    fn run(armatures: Vec<ArmatureSnapshot>) -> PoseScene {
        let source = FakeSource { armatures };
        collect(&source, SceneId(1), ViewLayerId(1))
    }

    #[test]
    fn bindingless_bones_contribute_nothing() {
        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::IDENTITY,
            bones: vec![bone(
                BoneBinding::new(),
                Vec3::ZERO,
                Vec3::new(0.0, 1.0, 0.0),
            )],
        }]);
        assert!(scene.is_empty());
        assert_eq!(scene.point_count(), 0);
        // The armature still contributes its (empty) body and face slots.
        assert_eq!(scene.bodies.len(), 1);
        assert_eq!(scene.faces.len(), 1);
        assert!(scene.hands.is_empty());
    }

    #[test]
    fn offset_interpolates_linearly_along_the_bone() {
        let head = Vec3::new(1.0, 2.0, 3.0);
        let tail = Vec3::new(3.0, 6.0, 7.0);
        let mut binding = BoneBinding::new();
        let _ = binding.add_body(BodyBinding::new(BodyKeypoint::Nose, 0.0));
        let _ = binding.add_body(BodyBinding::new(BodyKeypoint::Neck, 1.0));
        let _ =
            binding.add_body(BodyBinding::new(BodyKeypoint::RShoulder, 0.5));

        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::IDENTITY,
            bones: vec![bone(binding, head, tail)],
        }]);

        let body = &scene.bodies[0];
        assert_eq!(body[&BodyKeypoint::Nose], head);
        assert_eq!(body[&BodyKeypoint::Neck], tail);
        assert_eq!(body[&BodyKeypoint::RShoulder], (head + tail) * 0.5);
    }

    #[test]
    fn world_matrix_transforms_resolved_points() {
        let mut binding = BoneBinding::new();
        let _ = binding.add_body(BodyBinding::new(BodyKeypoint::Nose, 0.0));
        let translation = Vec3::new(10.0, -5.0, 2.0);

        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::from_translation(translation),
            bones: vec![bone(binding, Vec3::ONE, Vec3::ZERO)],
        }]);

        assert_eq!(
            scene.bodies[0][&BodyKeypoint::Nose],
            Vec3::ONE + translation
        );
    }

    #[test]
    fn hand_groups_merge_across_bones() {
        let mut first = BoneBinding::new();
        let _ = first.add_hand(HandBinding::new(3, HandJoint::Root, 0.0));
        let mut second = BoneBinding::new();
        let _ = second.add_hand(HandBinding::new(3, HandJoint::Thumb1, 1.0));

        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::IDENTITY,
            bones: vec![
                bone(first, Vec3::ZERO, Vec3::X),
                bone(second, Vec3::Y, Vec3::Z),
            ],
        }]);

        assert_eq!(scene.hands.len(), 1);
        let hand = &scene.hands[0];
        assert_eq!(hand.len(), 2);
        assert_eq!(hand[&HandJoint::Root], Vec3::ZERO);
        assert_eq!(hand[&HandJoint::Thumb1], Vec3::Z);
    }

    #[test]
    fn distinct_groups_become_distinct_hands_in_group_order() {
        let mut binding = BoneBinding::new();
        let _ = binding.add_hand(HandBinding::new(7, HandJoint::Root, 0.0));
        let _ = binding.add_hand(HandBinding::new(2, HandJoint::Root, 1.0));

        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::IDENTITY,
            bones: vec![bone(binding, Vec3::ZERO, Vec3::X)],
        }]);

        assert_eq!(scene.hands.len(), 2);
        // Ascending group id: group 2 first.
        assert_eq!(scene.hands[0][&HandJoint::Root], Vec3::X);
        assert_eq!(scene.hands[1][&HandJoint::Root], Vec3::ZERO);
    }

    #[test]
    fn body_index_collision_last_bone_wins() {
        let mut first = BoneBinding::new();
        let _ = first.add_body(BodyBinding::new(BodyKeypoint::Neck, 0.0));
        let mut second = BoneBinding::new();
        let _ = second.add_body(BodyBinding::new(BodyKeypoint::Neck, 0.0));

        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::IDENTITY,
            bones: vec![
                bone(first, Vec3::X, Vec3::X),
                bone(second, Vec3::Y, Vec3::Y),
            ],
        }]);

        assert_eq!(scene.bodies[0].len(), 1);
        assert_eq!(scene.bodies[0][&BodyKeypoint::Neck], Vec3::Y);
    }

    #[test]
    fn bone_without_pose_is_skipped_not_fatal() {
        let mut bound = BoneBinding::new();
        let _ = bound.add_body(BodyBinding::new(BodyKeypoint::Nose, 0.0));
        let mut broken = BoneBinding::new();
        let _ = broken.add_body(BodyBinding::new(BodyKeypoint::Neck, 0.0));
        let _ = broken.add_face(FaceBinding::new(0.5));

        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::IDENTITY,
            bones: vec![
                bone(bound.clone(), Vec3::X, Vec3::X),
                BoneSnapshot {
                    binding: broken,
                    pose: None,
                },
            ],
        }]);

        let body = &scene.bodies[0];
        assert_eq!(body.len(), 1);
        assert!(body.contains_key(&BodyKeypoint::Nose));
        assert!(scene.faces[0].is_empty());
    }

    #[test]
    fn faces_collect_in_bone_order_per_armature() {
        let mut first = BoneBinding::new();
        let _ = first.add_face(FaceBinding::new(0.0));
        let mut second = BoneBinding::new();
        let _ = second.add_face(FaceBinding::new(0.0));

        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::IDENTITY,
            bones: vec![
                bone(first, Vec3::X, Vec3::X),
                bone(second, Vec3::Y, Vec3::Y),
            ],
        }]);

        assert_eq!(scene.faces.len(), 1);
        assert_eq!(scene.faces[0], vec![Vec3::X, Vec3::Y]);
    }

    #[test]
    fn end_to_end_neck_shoulder_binding() {
        // One bone bound to Neck at the midpoint and RShoulder at the
        // tail; the collected instance holds exactly those two slots.
        let head = Vec3::new(0.0, 0.0, 1.0);
        let tail = Vec3::new(0.0, 0.0, 2.0);
        let mut binding = BoneBinding::new();
        let _ = binding.add_body(BodyBinding::new(BodyKeypoint::Neck, 0.5));
        let _ =
            binding.add_body(BodyBinding::new(BodyKeypoint::RShoulder, 1.0));

        let scene = run(vec![ArmatureSnapshot {
            world_matrix: Mat4::IDENTITY,
            bones: vec![bone(binding, head, tail)],
        }]);

        assert_eq!(scene.bodies.len(), 1);
        let body = &scene.bodies[0];
        assert_eq!(body.len(), 2);
        assert_eq!(body[&BodyKeypoint::Neck], (head + tail) * 0.5);
        assert_eq!(body[&BodyKeypoint::RShoulder], tail);
        assert!(scene.hands.is_empty());
        assert!(scene.faces[0].is_empty());
    }
}
