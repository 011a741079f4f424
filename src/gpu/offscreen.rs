//! Scoped offscreen capture target: an RGBA32F color texture plus a
//! staging buffer for synchronous pixel readback.
//!
//! The target is acquired per render call and released when dropped, so
//! every exit path — including an error mid-draw — restores the GPU
//! state it found.

use std::fmt;

use log::debug;

/// Bytes per RGBA32F pixel.
const BYTES_PER_PIXEL: u32 = 16;

/// Offscreen target acquisition and readback failures. Fatal for the
/// render call that hit them; partially acquired resources are released
/// before propagation.
#[derive(Debug)]
pub enum OffscreenError {
    /// Requested size exceeds the device's texture dimension limit.
    TooLarge {
        /// Requested `(width, height)`.
        size: (u32, u32),
        /// Device limit for either dimension.
        max: u32,
    },
    /// The staging buffer could not be mapped for readback.
    Readback,
}

impl fmt::Display for OffscreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { size, max } => write!(
                f,
                "offscreen target {}x{} exceeds device limit {max}",
                size.0, size.1
            ),
            Self::Readback => {
                write!(f, "offscreen readback mapping failed")
            }
        }
    }
}

impl std::error::Error for OffscreenError {}

/// RGBA32F render target with a padded-row staging buffer.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    staging: wgpu::Buffer,
    size: (u32, u32),
    padded_bytes_per_row: u32,
}

impl OffscreenTarget {
    /// Capture clear color: opaque black, matching what the downstream
    /// image pipeline expects for undrawn pixels.
    pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Allocate a target of `size` pixels.
    ///
    /// # Errors
    ///
    /// [`OffscreenError::TooLarge`] when either dimension exceeds the
    /// device's 2D texture limit.
    pub fn new(
        device: &wgpu::Device,
        size: (u32, u32),
    ) -> Result<Self, OffscreenError> {
        let max = device.limits().max_texture_dimension_2d;
        if size.0 > max || size.1 > max {
            return Err(OffscreenError::TooLarge { size, max });
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Overlay Capture Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Rows in a texture-to-buffer copy must be 256-byte aligned.
        let unpadded = size.0 * BYTES_PER_PIXEL;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded.div_ceil(align) * align;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Capture Staging Buffer"),
            size: u64::from(padded_bytes_per_row) * u64::from(size.1),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        debug!("acquired offscreen capture target {}x{}", size.0, size.1);
        Ok(Self {
            texture,
            view,
            staging,
            size,
            padded_bytes_per_row,
        })
    }

    /// Target size `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// The color attachment view.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Encode the texture-to-staging copy. Call after the render pass,
    /// before submission.
    pub fn copy_to_staging(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_bytes_per_row),
                    rows_per_image: Some(self.size.1),
                },
            },
            wgpu::Extent3d {
                width: self.size.0,
                height: self.size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Block until the staging buffer is mapped and return the pixels
    /// as a dense row-major RGBA f32 buffer with rows ordered
    /// bottom-up. Call after submitting the copy.
    ///
    /// # Errors
    ///
    /// [`OffscreenError::Readback`] when mapping fails.
    pub fn read_pixels(
        &self,
        device: &wgpu::Device,
    ) -> Result<Vec<f32>, OffscreenError> {
        let buffer_slice = self.staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        let _ = device.poll(wgpu::PollType::Wait);

        match receiver.recv() {
            Ok(Ok(())) => {}
            _ => return Err(OffscreenError::Readback),
        }

        let (width, height) = self.size;
        let floats_per_row = width as usize * 4;
        let mut pixels =
            vec![0.0f32; floats_per_row * height as usize];
        {
            let data = buffer_slice.get_mapped_range();
            let padded = self.padded_bytes_per_row as usize;
            for row in 0..height as usize {
                let src = &data[row * padded..][..floats_per_row * 4];
                // Texture row 0 is the top; the capture buffer is
                // bottom-up.
                let dst_row = height as usize - 1 - row;
                let dst = &mut pixels
                    [dst_row * floats_per_row..][..floats_per_row];
                dst.copy_from_slice(bytemuck::cast_slice(src));
            }
        }
        self.staging.unmap();
        Ok(pixels)
    }
}
