//! Draw-pass orchestration: one full overlay pass in fixed draw order.
//!
//! Order is load-bearing: links draw before sprites within each
//! collection, and bodies draw before hands before faces, so the opaque
//! joint sprites land on top of the limb quads they share endpoints
//! with.

use glam::Vec3;
use log::debug;

use super::style::{
    body_color, body_link_color, hand_link_color, OverlayMode, BODY_LINKS,
    BODY_WIDTH, FACE_COLOR, FACE_WIDTH, HAND_JOINT_COLOR, HAND_JOINT_WIDTH,
    HAND_LINKS, HAND_LINK_WIDTH,
};
use crate::scene::PoseScene;

/// One overlay primitive: a world-space segment rendered as an oriented
/// quad, or a point sprite when `start == end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDraw {
    /// Segment start, world space.
    pub start: Vec3,
    /// Segment end, world space. Equal to `start` for a point sprite.
    pub end: Vec3,
    /// Linear RGB fill color.
    pub color: [f32; 3],
    /// Quad thickness in raster units (sprite diameter for points).
    pub width: f32,
    /// `true` for a fully opaque quad; `false` applies the circular
    /// sprite mask. Stretched link quads never use the mask.
    pub rect: bool,
}

impl SegmentDraw {
    /// A point sprite at `point`.
    #[must_use]
    pub fn sprite(point: Vec3, color: [f32; 3], width: f32) -> Self {
        Self {
            start: point,
            end: point,
            color,
            width,
            rect: false,
        }
    }

    /// An opaque link quad from `start` to `end`.
    #[must_use]
    pub fn link(start: Vec3, end: Vec3, color: [f32; 3], width: f32) -> Self {
        Self {
            start,
            end,
            color,
            width,
            rect: true,
        }
    }
}

/// Receiver for overlay primitives, in submission order.
///
/// The draw pass is generic over this seam: the GPU renderer batches
/// segments into an instance buffer, while the software rasterizer
/// evaluates the same fragment rules on the CPU.
pub trait SegmentSink {
    /// Submit one segment. Submission order is blend order.
    fn draw_segment(&mut self, segment: &SegmentDraw);
}

/// Emit one full overlay pass for `scene` into `sink`.
///
/// `OverlayMode::None` emits nothing; `Body` stops after the body
/// collections; `Full` adds hands and faces. All widths scale by
/// `thickness`.
pub fn draw_pass(
    scene: &PoseScene,
    mode: OverlayMode,
    thickness: f32,
    sink: &mut dyn SegmentSink,
) {
    if mode == OverlayMode::None {
        return;
    }

    let mut segments = 0usize;
    for body in &scene.bodies {
        for (i, (a, b)) in BODY_LINKS.iter().enumerate() {
            if let (Some(start), Some(end)) = (body.get(a), body.get(b)) {
                sink.draw_segment(&SegmentDraw::link(
                    *start,
                    *end,
                    body_link_color(i),
                    BODY_WIDTH * thickness,
                ));
                segments += 1;
            }
        }
        for (keypoint, point) in body {
            sink.draw_segment(&SegmentDraw::sprite(
                *point,
                body_color(*keypoint),
                BODY_WIDTH * thickness,
            ));
            segments += 1;
        }
    }

    if mode == OverlayMode::Body {
        debug!("overlay pass emitted {segments} segments (body only)");
        return;
    }

    for hand in &scene.hands {
        for (i, (a, b)) in HAND_LINKS.iter().enumerate() {
            if let (Some(start), Some(end)) = (hand.get(a), hand.get(b)) {
                sink.draw_segment(&SegmentDraw::link(
                    *start,
                    *end,
                    hand_link_color(i),
                    HAND_LINK_WIDTH * thickness,
                ));
                segments += 1;
            }
        }
        for point in hand.values() {
            sink.draw_segment(&SegmentDraw::sprite(
                *point,
                HAND_JOINT_COLOR,
                HAND_JOINT_WIDTH * thickness,
            ));
            segments += 1;
        }
    }

    for face in &scene.faces {
        for point in face {
            sink.draw_segment(&SegmentDraw::sprite(
                *point,
                FACE_COLOR,
                FACE_WIDTH * thickness,
            ));
            segments += 1;
        }
    }
    debug!("overlay pass emitted {segments} segments (full)");
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::keypoint::{BodyKeypoint, HandJoint};

    #[derive(Default)]
    struct RecordingSink {
        segments: Vec<SegmentDraw>,
    }

    impl SegmentSink for RecordingSink {
        fn draw_segment(&mut self, segment: &SegmentDraw) {
            self.segments.push(*segment);
        }
    }

    fn neck_shoulder_scene() -> PoseScene {
        let mut body = BTreeMap::new();
        let _ = body.insert(BodyKeypoint::Neck, Vec3::new(0.0, 0.0, 1.5));
        let _ =
            body.insert(BodyKeypoint::RShoulder, Vec3::new(0.0, 0.0, 2.0));
        PoseScene {
            bodies: vec![body],
            hands: Vec::new(),
            faces: vec![Vec::new()],
        }
    }

    #[test]
    fn none_mode_emits_nothing() {
        let mut sink = RecordingSink::default();
        draw_pass(&neck_shoulder_scene(), OverlayMode::None, 2.0, &mut sink);
        assert!(sink.segments.is_empty());
    }

    #[test]
    fn neck_shoulder_draws_one_link_then_two_sprites() {
        let mut sink = RecordingSink::default();
        let scene = neck_shoulder_scene();
        draw_pass(&scene, OverlayMode::Body, 2.0, &mut sink);

        assert_eq!(sink.segments.len(), 3);
        // The Neck–RShoulder link comes first, dimmed to 60%.
        let link = &sink.segments[0];
        assert!(link.rect);
        assert_eq!(link.start, scene.bodies[0][&BodyKeypoint::Neck]);
        assert_eq!(link.end, scene.bodies[0][&BodyKeypoint::RShoulder]);
        assert_eq!(link.color, body_link_color(0));
        assert_eq!(link.width, BODY_WIDTH * 2.0);
        // Then full-intensity sprites for both keypoints.
        for sprite in &sink.segments[1..] {
            assert!(!sprite.rect);
            assert_eq!(sprite.start, sprite.end);
        }
        assert_eq!(sink.segments[1].color, body_color(BodyKeypoint::Neck));
    }

    #[test]
    fn body_mode_suppresses_hands_and_faces() {
        let mut scene = neck_shoulder_scene();
        let mut hand = BTreeMap::new();
        let _ = hand.insert(HandJoint::Root, Vec3::ZERO);
        scene.hands.push(hand);
        scene.faces[0].push(Vec3::ONE);

        let mut sink = RecordingSink::default();
        draw_pass(&scene, OverlayMode::Body, 1.0, &mut sink);
        assert_eq!(sink.segments.len(), 3);

        let mut full = RecordingSink::default();
        draw_pass(&scene, OverlayMode::Full, 1.0, &mut full);
        // One hand sprite (no links with a single joint) and one face
        // sprite on top of the body draws.
        assert_eq!(full.segments.len(), 5);
        assert_eq!(full.segments[3].color, HAND_JOINT_COLOR);
        assert_eq!(full.segments[4].color, FACE_COLOR);
        assert_eq!(full.segments[4].width, FACE_WIDTH);
    }

    #[test]
    fn hand_links_draw_between_present_joints_only() {
        let mut hand = BTreeMap::new();
        let _ = hand.insert(HandJoint::Root, Vec3::ZERO);
        let _ = hand.insert(HandJoint::Thumb1, Vec3::X);
        let _ = hand.insert(HandJoint::Ring3, Vec3::Y);
        let scene = PoseScene {
            bodies: Vec::new(),
            hands: vec![hand],
            faces: Vec::new(),
        };

        let mut sink = RecordingSink::default();
        draw_pass(&scene, OverlayMode::Full, 1.0, &mut sink);

        // Only Root–Thumb1 links (Ring3 has no present neighbor), then
        // three joint sprites.
        let links: Vec<_> =
            sink.segments.iter().filter(|s| s.rect).collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].color, hand_link_color(0));
        assert_eq!(links[0].width, HAND_LINK_WIDTH);
        let sprites: Vec<_> =
            sink.segments.iter().filter(|s| !s.rect).collect();
        assert_eq!(sprites.len(), 3);
    }

    #[test]
    fn empty_scene_emits_nothing_in_full_mode() {
        let mut sink = RecordingSink::default();
        draw_pass(&PoseScene::default(), OverlayMode::Full, 2.0, &mut sink);
        assert!(sink.segments.is_empty());
    }
}
