//! Scene-graph boundary traits, pose-scene collection, and the viewport
//! cache.
//!
//! The host tool owns the actual scene graph; this module sees it only
//! through [`SceneSource`], a narrow per-pass snapshot interface. The
//! collector resolves bone bindings into world-space keypoints, and
//! [`ViewportCache`] memoizes the result for the interactive draw loop.

mod cache;
mod collect;
mod source;

pub use cache::ViewportCache;
pub use collect::{collect, BodyInstance, HandInstance, PoseScene};
pub use source::{
    ArmatureSnapshot, BonePose, BoneSnapshot, FrameSink, SceneId,
    SceneSource, ViewLayerId,
};
