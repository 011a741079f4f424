//! The render driver: orchestrates one full overlay draw pass for
//! either target.
//!
//! The interactive path resolves its pose scene through the viewport
//! cache and draws into the host's bound framebuffer; the offscreen
//! path recollects on every call (each capture must reflect current
//! state), renders into a scoped RGBA32F target, and returns the pixel
//! buffer for the downstream image pipeline.

use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::gpu::offscreen::{OffscreenError, OffscreenTarget};
use crate::gpu::render_context::RenderContext;
use crate::options::OverlayOptions;
use crate::overlay::{OverlayRenderer, GAMMA_CAPTURE, GAMMA_VIEWPORT};
use crate::projection::{
    camera_projection, viewport_projection, ProjectionContext,
    ProjectionError, RenderCamera, ViewportState,
};
use crate::scene::{
    collect, FrameSink, PoseScene, SceneId, SceneSource, ViewLayerId,
    ViewportCache,
};

/// Overlay render failures.
///
/// Binding and geometry anomalies never surface here — they degrade the
/// drawing locally. These are the hard failures: missing camera, bad
/// projection preconditions, or GPU target acquisition/readback.
#[derive(Debug)]
pub enum RenderError {
    /// Offscreen capture requested but the scene has no active camera.
    NoActiveCamera,
    /// Camera projection precondition failure.
    Projection(ProjectionError),
    /// Offscreen target acquisition or readback failure.
    Offscreen(OffscreenError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveCamera => {
                write!(f, "scene has no active camera")
            }
            Self::Projection(e) => write!(f, "projection error: {e}"),
            Self::Offscreen(e) => write!(f, "offscreen error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoActiveCamera => None,
            Self::Projection(e) => Some(e),
            Self::Offscreen(e) => Some(e),
        }
    }
}

impl From<ProjectionError> for RenderError {
    fn from(e: ProjectionError) -> Self {
        Self::Projection(e)
    }
}

impl From<OffscreenError> for RenderError {
    fn from(e: OffscreenError) -> Self {
        Self::Offscreen(e)
    }
}

/// A completed offscreen capture: dense row-major RGBA floats, rows
/// ordered bottom-up.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureBuffer {
    size: (u32, u32),
    pixels: Vec<f32>,
}

impl CaptureBuffer {
    /// Wrap a raw pixel buffer. `pixels.len()` must equal
    /// `width * height * 4`.
    #[must_use]
    pub fn new(size: (u32, u32), pixels: Vec<f32>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            size.0 as usize * size.1 as usize * 4
        );
        Self { size, pixels }
    }

    /// Capture size `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// The RGBA pixel at `(x, y)`, with `y` counted from the bottom
    /// row.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let idx = (y as usize * self.size.0 as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Borrow the raw pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// Consume the buffer, returning the raw pixel data.
    #[must_use]
    pub fn into_pixels(self) -> Vec<f32> {
        self.pixels
    }
}

/// Boundary to the host's in-memory image store: captures are handed
/// over under a well-known name for the downstream generation pipeline.
pub trait CaptureSink {
    /// Store `buffer` under `name`, replacing any previous capture.
    fn store(&mut self, name: &str, buffer: &CaptureBuffer);
}

/// The well-known image resource name for a capture of
/// `(scene, view layer)`.
#[must_use]
pub fn capture_name(scene: &str, view_layer: &str) -> String {
    format!("._OpenPose_{scene}_{view_layer}")
}

/// Cache-backed overlay render driver.
///
/// One long-lived engine per host session; the host wires its
/// change-notification callback to [`OverlayEngine::notify_scene_changed`]
/// and calls the prepare/draw pair from its viewport draw handler.
#[derive(Default)]
pub struct OverlayEngine {
    cache: ViewportCache,
    options: OverlayOptions,
    capture_renderer: Option<OverlayRenderer>,
}

impl OverlayEngine {
    /// Engine with the given options.
    #[must_use]
    pub fn new(options: OverlayOptions) -> Self {
        Self {
            cache: ViewportCache::new(),
            options: options.sanitized(),
            capture_renderer: None,
        }
    }

    /// Current overlay options.
    #[must_use]
    pub fn options(&self) -> OverlayOptions {
        self.options
    }

    /// Replace the overlay options.
    ///
    /// The cached pose scene is left untouched — options only affect
    /// what the next pass draws, not what was collected. Hosts should
    /// request a viewport redraw after changing options.
    pub fn set_options(&mut self, options: OverlayOptions) {
        self.options = options.sanitized();
    }

    /// Host change-notification entry: any scene-graph mutation
    /// (object transforms, bone poses, binding edits) must land here.
    ///
    /// Eagerly recollects the viewport scene and requests a redraw,
    /// matching the interactive tool's expectation that the overlay is
    /// never more than one notification stale.
    pub fn notify_scene_changed(
        &mut self,
        source: &dyn SceneSource,
        scene: SceneId,
        view_layer: ViewLayerId,
        sink: &dyn FrameSink,
    ) {
        let _ = self.cache.get_or_refresh(source, scene, view_layer, true, sink);
    }

    /// Drop the cached viewport scene without recollecting.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// The viewport cache (for host-side inspection and tests).
    #[must_use]
    pub fn cache(&self) -> &ViewportCache {
        &self.cache
    }

    /// Resolve the pose scene for a viewport draw through the cache.
    ///
    /// Returns `None` when the host's overlay toggle is off — the draw
    /// is skipped entirely, leaving cache state untouched.
    pub fn resolve_viewport_scene(
        &mut self,
        source: &dyn SceneSource,
        view: &dyn ViewportState,
        sink: &dyn FrameSink,
    ) -> Option<Rc<PoseScene>> {
        if !view.overlays_visible() {
            return None;
        }
        Some(self.cache.get_or_refresh(
            source,
            view.active_scene(),
            view.active_view_layer(),
            false,
            sink,
        ))
    }

    /// Prepare the viewport overlay batch for the current frame.
    ///
    /// Returns `false` when nothing will draw (overlays hidden). On
    /// `true`, the host draws the batch inside its own render pass via
    /// [`OverlayRenderer::draw`].
    pub fn prepare_viewport(
        &mut self,
        source: &dyn SceneSource,
        view: &dyn ViewportState,
        renderer: &mut OverlayRenderer,
        context: &RenderContext,
        sink: &dyn FrameSink,
    ) -> bool {
        let Some(scene) = self.resolve_viewport_scene(source, view, sink)
        else {
            return false;
        };
        let projection = viewport_projection(view);
        renderer.prepare(
            &context.device,
            &context.queue,
            &scene,
            self.options,
            &projection,
            GAMMA_VIEWPORT,
        );
        true
    }

    /// Resolve the inputs of an offscreen render: a fresh collection
    /// (no caching) and the camera projection.
    ///
    /// # Errors
    ///
    /// [`RenderError::NoActiveCamera`] when `camera` is `None`;
    /// [`RenderError::Projection`] on camera precondition failures.
    pub fn resolve_offscreen_inputs(
        source: &dyn SceneSource,
        scene: SceneId,
        view_layer: ViewLayerId,
        camera: Option<&dyn RenderCamera>,
    ) -> Result<(PoseScene, ProjectionContext), RenderError> {
        let camera = camera.ok_or(RenderError::NoActiveCamera)?;
        let projection = camera_projection(camera)?;
        Ok((collect(source, scene, view_layer), projection))
    }

    /// Render the overlay into an offscreen RGBA32F target and read the
    /// pixels back.
    ///
    /// Bypasses the viewport cache — every capture reflects current
    /// scene state. Unlike the viewport path, mode and thickness come
    /// from the caller: capture jobs carry their own settings,
    /// independent of the interactive preferences. The offscreen target
    /// is scoped to this call and released on every exit path.
    ///
    /// # Errors
    ///
    /// [`RenderError::NoActiveCamera`], [`RenderError::Projection`], or
    /// [`RenderError::Offscreen`] per the failure taxonomy; a failed
    /// render produces no capture.
    pub fn render_offscreen(
        &mut self,
        source: &dyn SceneSource,
        scene: SceneId,
        view_layer: ViewLayerId,
        camera: Option<&dyn RenderCamera>,
        options: OverlayOptions,
        context: &RenderContext,
    ) -> Result<CaptureBuffer, RenderError> {
        let (pose_scene, projection) =
            Self::resolve_offscreen_inputs(source, scene, view_layer, camera)?;

        let target =
            OffscreenTarget::new(&context.device, projection.raster_size)?;
        let renderer = self.capture_renderer.get_or_insert_with(|| {
            OverlayRenderer::new(
                &context.device,
                wgpu::TextureFormat::Rgba32Float,
            )
        });
        renderer.prepare(
            &context.device,
            &context.queue,
            &pose_scene,
            options.sanitized(),
            &projection,
            GAMMA_CAPTURE,
        );

        let mut encoder = context.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor {
                label: Some("Overlay Capture Encoder"),
            },
        );
        {
            let mut render_pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Overlay Capture Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: target.view(),
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(
                                    OffscreenTarget::CLEAR_COLOR,
                                ),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    ..Default::default()
                });
            renderer.draw(&mut render_pass);
        }
        target.copy_to_staging(&mut encoder);
        let _ = context.queue.submit(std::iter::once(encoder.finish()));

        let pixels = target.read_pixels(&context.device)?;
        debug!(
            "captured offscreen overlay {}x{} ({} segments)",
            projection.raster_size.0,
            projection.raster_size.1,
            renderer.segment_count()
        );
        Ok(CaptureBuffer::new(projection.raster_size, pixels))
    }

    /// Render offscreen and hand the capture to the host's image store
    /// under the well-known name for the request's scene and layer
    /// names.
    ///
    /// # Errors
    ///
    /// Propagates [`RenderError`] from [`OverlayEngine::render_offscreen`];
    /// nothing is stored on failure.
    pub fn render_offscreen_into(
        &mut self,
        source: &dyn SceneSource,
        request: &CaptureRequest<'_>,
        context: &RenderContext,
        capture_sink: &mut dyn CaptureSink,
    ) -> Result<(), RenderError> {
        let buffer = self.render_offscreen(
            source,
            request.scene,
            request.view_layer,
            request.camera,
            request.options,
            context,
        )?;
        capture_sink.store(
            &capture_name(request.scene_name, request.layer_name),
            &buffer,
        );
        Ok(())
    }
}

/// Everything an offscreen capture-and-store needs from the caller.
pub struct CaptureRequest<'a> {
    /// Scene to collect.
    pub scene: SceneId,
    /// View layer filtering visibility.
    pub view_layer: ViewLayerId,
    /// The scene's active render camera, if any.
    pub camera: Option<&'a dyn RenderCamera>,
    /// Overlay mode and thickness for this capture job.
    pub options: OverlayOptions,
    /// Scene display name, for the stored image resource name.
    pub scene_name: &'a str,
    /// View layer display name, for the stored image resource name.
    pub layer_name: &'a str,
}
