//! Overlay rasterization: draw-pass orchestration, the instanced GPU
//! renderer, and a CPU reference rasterizer implementing the same
//! per-fragment rules.

mod pass;
mod renderer;
mod software;
mod style;

pub use pass::{draw_pass, SegmentDraw, SegmentSink};
pub use renderer::OverlayRenderer;
pub use software::SoftwareRasterizer;
pub use style::{
    body_color, body_link_color, hand_link_color, OverlayMode, BODY_COLORS,
    BODY_LINKS, BODY_WIDTH, FACE_COLOR, FACE_WIDTH, GAMMA_CAPTURE,
    GAMMA_VIEWPORT, HAND_JOINT_COLOR, HAND_JOINT_WIDTH, HAND_LINKS,
    HAND_LINK_WIDTH,
};
