//! Fixed overlay style tables: link topology, part colors, and draw
//! widths.
//!
//! The body color and link tables follow the OpenPose annotator
//! conventions so captures feed downstream tooling unchanged.

use serde::{Deserialize, Serialize};

use crate::keypoint::{BodyKeypoint, HandJoint};

/// How much of the skeleton the overlay draws.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OverlayMode {
    /// Draw nothing.
    None,
    /// Body keypoints and limbs only.
    #[default]
    Body,
    /// Bodies, then hands, then faces.
    Full,
}

/// Per-slot body part colors (8-bit RGB), indexed by keypoint slot for
/// sprites and by link index for limbs.
pub const BODY_COLORS: [[u8; 3]; BodyKeypoint::COUNT] = [
    [255, 0, 0],
    [255, 85, 0],
    [255, 170, 0],
    [255, 255, 0],
    [170, 255, 0],
    [85, 255, 0],
    [0, 255, 0],
    [0, 255, 85],
    [0, 255, 170],
    [0, 255, 255],
    [0, 170, 255],
    [0, 85, 255],
    [0, 0, 255],
    [85, 0, 255],
    [170, 0, 255],
    [255, 0, 255],
    [255, 0, 170],
    [255, 0, 85],
];

/// The 17 fixed limb links drawn between body keypoints.
pub const BODY_LINKS: [(BodyKeypoint, BodyKeypoint); 17] = [
    (BodyKeypoint::Neck, BodyKeypoint::RShoulder),
    (BodyKeypoint::Neck, BodyKeypoint::LShoulder),
    (BodyKeypoint::RShoulder, BodyKeypoint::RElbow),
    (BodyKeypoint::RElbow, BodyKeypoint::RWrist),
    (BodyKeypoint::LShoulder, BodyKeypoint::LElbow),
    (BodyKeypoint::LElbow, BodyKeypoint::LWrist),
    (BodyKeypoint::Neck, BodyKeypoint::RHip),
    (BodyKeypoint::RHip, BodyKeypoint::RKnee),
    (BodyKeypoint::RKnee, BodyKeypoint::RAnkle),
    (BodyKeypoint::Neck, BodyKeypoint::LHip),
    (BodyKeypoint::LHip, BodyKeypoint::LKnee),
    (BodyKeypoint::LKnee, BodyKeypoint::LAnkle),
    (BodyKeypoint::Neck, BodyKeypoint::Nose),
    (BodyKeypoint::Nose, BodyKeypoint::REye),
    (BodyKeypoint::REye, BodyKeypoint::REar),
    (BodyKeypoint::Nose, BodyKeypoint::LEye),
    (BodyKeypoint::LEye, BodyKeypoint::LEar),
];

/// The 20 fixed hand links: each finger chains from the root outward.
pub const HAND_LINKS: [(HandJoint, HandJoint); 20] = [
    (HandJoint::Root, HandJoint::Thumb1),
    (HandJoint::Thumb1, HandJoint::Thumb2),
    (HandJoint::Thumb2, HandJoint::Thumb3),
    (HandJoint::Thumb3, HandJoint::Thumb4),
    (HandJoint::Root, HandJoint::Index1),
    (HandJoint::Index1, HandJoint::Index2),
    (HandJoint::Index2, HandJoint::Index3),
    (HandJoint::Index3, HandJoint::Index4),
    (HandJoint::Root, HandJoint::Middle1),
    (HandJoint::Middle1, HandJoint::Middle2),
    (HandJoint::Middle2, HandJoint::Middle3),
    (HandJoint::Middle3, HandJoint::Middle4),
    (HandJoint::Root, HandJoint::Ring1),
    (HandJoint::Ring1, HandJoint::Ring2),
    (HandJoint::Ring2, HandJoint::Ring3),
    (HandJoint::Ring3, HandJoint::Ring4),
    (HandJoint::Root, HandJoint::Pinky1),
    (HandJoint::Pinky1, HandJoint::Pinky2),
    (HandJoint::Pinky2, HandJoint::Pinky3),
    (HandJoint::Pinky3, HandJoint::Pinky4),
];

/// Base width for body limbs and keypoint sprites.
pub const BODY_WIDTH: f32 = 8.0;
/// Base width for the thin rectangular hand links.
pub const HAND_LINK_WIDTH: f32 = 2.0;
/// Base width for hand joint sprites.
pub const HAND_JOINT_WIDTH: f32 = 8.0;
/// Base width for face point sprites.
pub const FACE_WIDTH: f32 = 6.0;

/// Hand joint sprite color (blue).
pub const HAND_JOINT_COLOR: [f32; 3] = [0.0, 0.0, 1.0];
/// Face point sprite color (white).
pub const FACE_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Display gamma applied in the live viewport (matches the view
/// transform).
pub const GAMMA_VIEWPORT: f32 = 2.2;
/// Identity gamma for offscreen capture — the buffer is consumed as raw
/// linear data downstream.
pub const GAMMA_CAPTURE: f32 = 1.0;

/// Intensity scale applied to limb link colors relative to their sprite
/// colors.
const LINK_INTENSITY: f32 = 0.6;

/// Full-intensity sprite color for a body keypoint slot.
#[must_use]
pub fn body_color(keypoint: BodyKeypoint) -> [f32; 3] {
    let [r, g, b] = BODY_COLORS[keypoint.index()];
    [
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    ]
}

/// Dimmed limb color for a body link index.
#[must_use]
pub fn body_link_color(link: usize) -> [f32; 3] {
    let [r, g, b] = BODY_COLORS[link];
    [
        f32::from(r) / 255.0 * LINK_INTENSITY,
        f32::from(g) / 255.0 * LINK_INTENSITY,
        f32::from(b) / 255.0 * LINK_INTENSITY,
    ]
}

/// Hand link color: hue swept across the link index at full saturation
/// and value.
#[must_use]
pub fn hand_link_color(link: usize) -> [f32; 3] {
    hsv_to_rgb(link as f32 / HAND_LINKS.len() as f32, 1.0, 1.0)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i32).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_tables_have_expected_topology() {
        assert_eq!(BODY_LINKS.len(), 17);
        assert_eq!(HAND_LINKS.len(), 20);
        // Link list entry [1, 2] is Neck–RShoulder.
        assert_eq!(
            BODY_LINKS[0],
            (BodyKeypoint::Neck, BodyKeypoint::RShoulder)
        );
        // Every finger chains back to the root.
        for finger in 0..5 {
            assert_eq!(HAND_LINKS[finger * 4].0, HandJoint::Root);
        }
    }

    #[test]
    fn body_colors_scale_to_unit_range() {
        assert_eq!(body_color(BodyKeypoint::Nose), [1.0, 0.0, 0.0]);
        let dimmed = body_link_color(0);
        assert_eq!(dimmed, [0.6, 0.0, 0.0]);
    }

    #[test]
    fn hand_link_hue_sweep() {
        // Hue 0 is pure red.
        assert_eq!(hand_link_color(0), [1.0, 0.0, 0.0]);
        // Hue 0.5 (link 10 of 20) is pure cyan.
        let cyan = hand_link_color(10);
        assert!((cyan[0] - 0.0).abs() < 1e-6);
        assert!((cyan[1] - 1.0).abs() < 1e-6);
        assert!((cyan[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overlay_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OverlayMode::Full).unwrap(),
            "\"full\""
        );
        let parsed: OverlayMode = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(parsed, OverlayMode::None);
        assert_eq!(OverlayMode::default(), OverlayMode::Body);
    }
}
