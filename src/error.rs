//! Crate-level error types.

use std::fmt;

use crate::engine::RenderError;
use crate::gpu::render_context::RenderContextError;
use crate::options::OptionsError;
use crate::projection::ProjectionError;

/// Errors produced by the poseline crate.
#[derive(Debug)]
pub enum PoselineError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Overlay render failure (offscreen target or projection).
    Render(RenderError),
    /// Options parsing/serialization failure.
    Options(OptionsError),
}

impl fmt::Display for PoselineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Render(e) => write!(f, "render error: {e}"),
            Self::Options(e) => write!(f, "options error: {e}"),
        }
    }
}

impl std::error::Error for PoselineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Render(e) => Some(e),
            Self::Options(e) => Some(e),
        }
    }
}

impl From<RenderContextError> for PoselineError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<RenderError> for PoselineError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

impl From<OptionsError> for PoselineError {
    fn from(e: OptionsError) -> Self {
        Self::Options(e)
    }
}

impl From<ProjectionError> for PoselineError {
    fn from(e: ProjectionError) -> Self {
        Self::Render(RenderError::Projection(e))
    }
}
