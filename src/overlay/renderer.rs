//! Instanced GPU renderer for overlay segments.
//!
//! Rebinding uniforms per segment would cost one draw call each; the
//! renderer instead batches one `SegmentInstance` per segment into a
//! storage buffer and expands a 6-vertex quad per instance in the
//! vertex shader. Hardware blending is applied in instance order, so
//! submission order remains blend order and the links-then-sprites
//! layering survives the batching.

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use super::pass::{draw_pass, SegmentDraw, SegmentSink};
use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::options::OverlayOptions;
use crate::projection::ProjectionContext;
use crate::scene::PoseScene;

/// Per-instance data for one overlay segment.
/// Must match the WGSL SegmentInstance struct layout.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SegmentInstance {
    /// xyz = world start, w = quad width
    start: [f32; 4],
    /// xyz = world end, w = rect flag (0 = circular sprite mask)
    end: [f32; 4],
    /// rgb = fill color, w unused
    color: [f32; 4],
}

/// Per-pass uniforms.
/// Must match the WGSL Globals struct layout.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct OverlayUniform {
    transform: [[f32; 4]; 4],
    size: [f32; 2],
    gamma: f32,
    _pad: f32,
}

/// Collects draw-pass segments into instance records.
#[derive(Default)]
struct InstanceSink {
    instances: Vec<SegmentInstance>,
}

impl SegmentSink for InstanceSink {
    fn draw_segment(&mut self, segment: &SegmentDraw) {
        self.instances.push(SegmentInstance {
            start: [
                segment.start.x,
                segment.start.y,
                segment.start.z,
                segment.width,
            ],
            end: [
                segment.end.x,
                segment.end.y,
                segment.end.z,
                if segment.rect { 1.0 } else { 0.0 },
            ],
            color: [
                segment.color[0],
                segment.color[1],
                segment.color[2],
                0.0,
            ],
        });
    }
}

/// GPU implementation of the segment-draw contract.
///
/// One renderer per target format: the interactive viewport uses the
/// host surface format, the offscreen capture path uses
/// `Rgba32Float`.
pub struct OverlayRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    instance_buffer: TypedBuffer<SegmentInstance>,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    instance_count: u32,
}

impl OverlayRenderer {
    /// Create the pipeline and buffers for the given target format.
    #[must_use]
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let uniform_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Overlay Uniform Buffer"),
                contents: bytemuck::bytes_of(&OverlayUniform::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let instance_buffer = TypedBuffer::new_with_data(
            device,
            "Overlay Instance Buffer",
            &[SegmentInstance::zeroed()],
            wgpu::BufferUsages::STORAGE,
        );

        let bind_group_layout = Self::create_bind_group_layout(device);
        let bind_group = Self::create_bind_group(
            device,
            &bind_group_layout,
            &uniform_buffer,
            &instance_buffer,
        );
        let pipeline =
            Self::create_pipeline(device, &bind_group_layout, format);

        Self {
            pipeline,
            uniform_buffer,
            instance_buffer,
            bind_group_layout,
            bind_group,
            instance_count: 0,
        }
    }

    fn create_bind_group_layout(
        device: &wgpu::Device,
    ) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage {
                            read_only: true,
                        },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        instance_buffer: &TypedBuffer<SegmentInstance>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: instance_buffer.buffer().as_entire_binding(),
                },
            ],
            label: Some("Overlay Bind Group"),
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/segment_overlay.wgsl"
        ));

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Overlay Pipeline Layout"),
                bind_group_layouts: &[bind_group_layout],
                push_constant_ranges: &[],
            });

        // Every fragment that survives the discards is fully opaque, so
        // skipping blending on float targets (not blendable without
        // FLOAT32_BLENDABLE) produces identical output.
        let blend = if format == wgpu::TextureFormat::Rgba32Float {
            None
        } else {
            Some(wgpu::BlendState::ALPHA_BLENDING)
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Batch one overlay pass and upload it.
    ///
    /// Runs the shared draw pass over `scene`, writes the uniform block
    /// and instance buffer, and recreates the bind group when the
    /// instance buffer reallocated.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &PoseScene,
        options: OverlayOptions,
        projection: &ProjectionContext,
        gamma: f32,
    ) {
        let mut sink = InstanceSink::default();
        draw_pass(scene, options.mode, options.thickness, &mut sink);

        let uniform = OverlayUniform {
            transform: projection.view_proj.to_cols_array_2d(),
            size: [
                projection.raster_size.0 as f32,
                projection.raster_size.1 as f32,
            ],
            gamma,
            _pad: 0.0,
        };
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&uniform),
        );

        let reallocated =
            self.instance_buffer.write(device, queue, &sink.instances);
        if reallocated {
            self.bind_group = Self::create_bind_group(
                device,
                &self.bind_group_layout,
                &self.uniform_buffer,
                &self.instance_buffer,
            );
        }
        self.instance_count = sink.instances.len() as u32;
    }

    /// Draw the prepared batch into an open render pass.
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.instance_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        // 6 vertices per quad, one quad per segment.
        render_pass.draw(0..6, 0..self.instance_count);
    }

    /// Number of segments in the prepared batch.
    #[must_use]
    pub fn segment_count(&self) -> u32 {
        self.instance_count
    }
}
