//! GPU plumbing: context ownership, growable buffers, and the offscreen
//! capture target.

pub mod dynamic_buffer;
pub mod offscreen;
pub mod render_context;

pub use offscreen::{OffscreenError, OffscreenTarget};
pub use render_context::{RenderContext, RenderContextError};
