//! Projection contexts for the two render paths.
//!
//! A [`ProjectionContext`] is derived fresh on every draw call — the
//! camera can move every frame, so nothing here is cached. The
//! interactive path reads the host viewport's current matrix directly;
//! the camera path composes the camera projection with the inverse of
//! its world transform, producing a view-projection matrix applied to
//! world-space points.

use std::fmt;

use glam::Mat4;

use crate::scene::{SceneId, ViewLayerId};

/// Raster size and world-to-clip matrix for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionContext {
    /// Output raster size in pixels `(width, height)`.
    pub raster_size: (u32, u32),
    /// Combined view-projection matrix mapping world space to clip
    /// space.
    pub view_proj: Mat4,
}

/// Interactive viewport state boundary.
///
/// Supplied by the host's 3D view; the matrix is whatever
/// perspective/orthographic transform the view currently uses
/// (camera-agnostic).
pub trait ViewportState {
    /// Identity of the active scene (cache key).
    fn active_scene(&self) -> SceneId;
    /// Identity of the active view layer (cache key).
    fn active_view_layer(&self) -> ViewLayerId;
    /// Whether the host's overlay toggle is on. When `false` the
    /// viewport overlay draw is skipped entirely.
    fn overlays_visible(&self) -> bool;
    /// Current viewport pixel dimensions.
    fn viewport_size(&self) -> (u32, u32);
    /// The view's current world-to-clip matrix.
    fn perspective_matrix(&self) -> Mat4;
}

/// Scene render-camera boundary, used for offscreen capture.
pub trait RenderCamera {
    /// Configured render resolution `(width, height)`.
    fn resolution(&self) -> (u32, u32);
    /// Pixel aspect scale `(x, y)`.
    fn pixel_aspect(&self) -> (f32, f32);
    /// Camera projection matrix for the given resolution and pixel
    /// aspect.
    fn projection_matrix(
        &self,
        resolution: (u32, u32),
        pixel_aspect: (f32, f32),
    ) -> Mat4;
    /// Camera object-to-world transform.
    fn world_matrix(&self) -> Mat4;
}

/// Camera-mode projection failures. These are hard preconditions: the
/// caller must fail the render rather than draw with meaningless
/// geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    /// The configured render resolution has a zero dimension.
    InvalidResolution {
        /// The offending `(width, height)`.
        resolution: (u32, u32),
    },
    /// The camera world matrix is not invertible.
    SingularCamera,
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidResolution { resolution } => write!(
                f,
                "invalid render resolution {}x{}",
                resolution.0, resolution.1
            ),
            Self::SingularCamera => {
                write!(f, "camera world matrix is not invertible")
            }
        }
    }
}

impl std::error::Error for ProjectionError {}

/// Projection for the live viewport: current pixel size and the view's
/// own matrix, passed through unchanged.
#[must_use]
pub fn viewport_projection(view: &dyn ViewportState) -> ProjectionContext {
    ProjectionContext {
        raster_size: view.viewport_size(),
        view_proj: view.perspective_matrix(),
    }
}

/// Projection for a scene camera: render resolution and
/// `projection * inverse(world)`.
///
/// Deterministic: two calls with unchanged camera state produce
/// bit-identical matrices, which the offscreen capture path relies on.
///
/// # Errors
///
/// [`ProjectionError::InvalidResolution`] when a resolution dimension is
/// zero; [`ProjectionError::SingularCamera`] when the camera world
/// matrix cannot be inverted.
pub fn camera_projection(
    camera: &dyn RenderCamera,
) -> Result<ProjectionContext, ProjectionError> {
    let resolution = camera.resolution();
    if resolution.0 == 0 || resolution.1 == 0 {
        return Err(ProjectionError::InvalidResolution { resolution });
    }

    let world = camera.world_matrix();
    let det = world.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(ProjectionError::SingularCamera);
    }

    let projection =
        camera.projection_matrix(resolution, camera.pixel_aspect());
    Ok(ProjectionContext {
        raster_size: resolution,
        view_proj: projection * world.inverse(),
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    struct FakeCamera {
        resolution: (u32, u32),
        world: Mat4,
    }

    impl RenderCamera for FakeCamera {
        fn resolution(&self) -> (u32, u32) {
            self.resolution
        }

        fn pixel_aspect(&self) -> (f32, f32) {
            (1.0, 1.0)
        }

        fn projection_matrix(
            &self,
            resolution: (u32, u32),
            _pixel_aspect: (f32, f32),
        ) -> Mat4 {
            let aspect = resolution.0 as f32 / resolution.1 as f32;
            Mat4::perspective_rh(45f32.to_radians(), aspect, 0.1, 100.0)
        }

        fn world_matrix(&self) -> Mat4 {
            self.world
        }
    }

    #[test]
    fn camera_projection_composes_projection_and_inverse_world() {
        let camera = FakeCamera {
            resolution: (1920, 1080),
            world: Mat4::from_translation(Vec3::new(0.0, -3.0, 1.0)),
        };
        let ctx = camera_projection(&camera).unwrap();

        assert_eq!(ctx.raster_size, (1920, 1080));
        let expected = camera.projection_matrix((1920, 1080), (1.0, 1.0))
            * camera.world.inverse();
        assert_eq!(ctx.view_proj, expected);
    }

    #[test]
    fn camera_projection_is_bit_identical_for_unchanged_state() {
        let camera = FakeCamera {
            resolution: (800, 600),
            world: Mat4::from_rotation_y(0.7)
                * Mat4::from_translation(Vec3::splat(2.5)),
        };
        let a = camera_projection(&camera).unwrap();
        let b = camera_projection(&camera).unwrap();
        assert_eq!(
            a.view_proj.to_cols_array(),
            b.view_proj.to_cols_array()
        );
    }

    #[test]
    fn zero_resolution_is_a_hard_failure() {
        let camera = FakeCamera {
            resolution: (0, 1080),
            world: Mat4::IDENTITY,
        };
        assert_eq!(
            camera_projection(&camera),
            Err(ProjectionError::InvalidResolution {
                resolution: (0, 1080)
            })
        );
    }

    #[test]
    fn singular_camera_matrix_is_a_hard_failure() {
        let camera = FakeCamera {
            resolution: (640, 480),
            world: Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)),
        };
        assert_eq!(
            camera_projection(&camera),
            Err(ProjectionError::SingularCamera)
        );
    }
}
