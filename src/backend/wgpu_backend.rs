//! On-screen backend built on wgpu.
//!
//! wgpu has no notion of "set a uniform, then draw". To keep the GL-style contract of
//! [`RenderBackend`], every draw call snapshots the program's [`SceneUniforms`] into a
//! list. [`present`](RenderBackend::present) writes all snapshots into one uniform
//! buffer at aligned offsets and replays the draws in a single render pass, binding
//! each snapshot with a dynamic offset.
//!
//! # Pipeline configuration
//!
//! - Three vertex buffers, one per attribute (position, color, normal), `Float32x3`
//! - 16-bit indices
//! - No face culling
//! - Depth write with Less-than comparison into a `Depth32Float` buffer

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::backend::{
    AttributeSlot, BufferHandle, ProgramHandle, ProgramState, RenderBackend, SceneUniforms,
    validate_attribute_data,
};
use crate::color::Color;
use crate::error::RenderError;
use crate::gpu::GpuContext;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const fn attribute_layout(location: u32) -> [wgpu::VertexAttribute; 1] {
    [wgpu::VertexAttribute {
        offset: 0,
        shader_location: location,
        format: wgpu::VertexFormat::Float32x3,
    }]
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    attribute_layout(AttributeSlot::Position as u32);
const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = attribute_layout(AttributeSlot::Color as u32);
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    attribute_layout(AttributeSlot::Normal as u32);

const VERTEX_LAYOUTS: [wgpu::VertexBufferLayout<'static>; 3] = [
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    },
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &COLOR_ATTRIBUTES,
    },
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &NORMAL_ATTRIBUTES,
    },
];

struct GpuProgram {
    triangles: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
    state: ProgramState,
}

enum GpuBuffer {
    Vertex(wgpu::Buffer),
    Index { buffer: wgpu::Buffer, len: u32 },
}

struct PendingDraw {
    program: ProgramHandle,
    lines: bool,
    uniforms: SceneUniforms,
    attributes: [BufferHandle; 3],
    index_buffer: BufferHandle,
    count: u32,
}

/// A [`RenderBackend`] that presents to a window surface.
pub struct WgpuBackend {
    /// The GPU context this backend renders with.
    pub gpu: GpuContext,
    programs: Vec<GpuProgram>,
    buffers: Vec<GpuBuffer>,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_capacity: usize,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    frame: Vec<PendingDraw>,
    clear_color: wgpu::Color,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let uniform_layout =
            gpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Scene Uniform Layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<SceneUniforms>() as u64,
                            ),
                        },
                        count: None,
                    }],
                });

        let uniform_capacity = 128;
        let (uniform_buffer, uniform_bind_group) =
            create_uniform_buffer(&gpu.device, &uniform_layout, uniform_capacity);
        let depth_view = create_depth_texture(&gpu.device, gpu.width(), gpu.height());
        let depth_size = (gpu.width(), gpu.height());

        Self {
            gpu,
            programs: Vec::new(),
            buffers: Vec::new(),
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_capacity,
            depth_view,
            depth_size,
            frame: Vec::new(),
            clear_color: wgpu::Color::BLACK,
        }
    }

    /// Resizes the surface; the depth buffer follows on the next present.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    fn program_mut(&mut self, program: ProgramHandle) -> Result<&mut GpuProgram, RenderError> {
        self.programs.get_mut(program.0).ok_or(RenderError::UnknownHandle {
            kind: "program",
            index: program.0,
        })
    }

    fn build_pipeline(
        &self,
        layout: &wgpu::PipelineLayout,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
        topology: wgpu::PrimitiveTopology,
    ) -> wgpu::RenderPipeline {
        self.gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Scene Pipeline"),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: vertex,
                    entry_point: Some("vs_main"),
                    buffers: &VERTEX_LAYOUTS,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: fragment,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.gpu.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    fn queue_draw(
        &mut self,
        program: ProgramHandle,
        index_buffer: BufferHandle,
        count: u32,
        lines: bool,
    ) -> Result<(), RenderError> {
        match self.buffers.get(index_buffer.0) {
            Some(GpuBuffer::Index { len, .. }) if count <= *len => {}
            Some(GpuBuffer::Index { len, .. }) => {
                return Err(RenderError::BufferAllocation(format!(
                    "draw of {count} indices from a buffer holding {len}"
                )));
            }
            _ => {
                return Err(RenderError::UnknownHandle {
                    kind: "index buffer",
                    index: index_buffer.0,
                });
            }
        }

        let state = &self.program_mut(program)?.state;
        let attributes = state.bound_attributes()?;
        let uniforms = state.uniforms;
        self.frame.push(PendingDraw {
            program,
            lines,
            uniforms,
            attributes,
            index_buffer,
            count,
        });
        Ok(())
    }

    /// Grows the dynamic uniform buffer to hold `count` snapshots. Returns the stride.
    fn ensure_uniform_capacity(&mut self, count: usize) -> usize {
        let stride = uniform_stride(&self.gpu.device);
        if count > self.uniform_capacity {
            let capacity = count.next_power_of_two();
            let (buffer, bind_group) =
                create_uniform_buffer(&self.gpu.device, &self.uniform_layout, capacity);
            self.uniform_buffer = buffer;
            self.uniform_bind_group = bind_group;
            self.uniform_capacity = capacity;
            log::debug!("Grew scene uniform buffer to {capacity} draws");
        }
        stride
    }

    fn ensure_depth_size(&mut self) {
        let size = (self.gpu.width(), self.gpu.height());
        if size != self.depth_size {
            self.depth_view = create_depth_texture(&self.gpu.device, size.0, size.1);
            self.depth_size = size;
        }
    }

    fn vertex_buffer(&self, handle: BufferHandle) -> Result<&wgpu::Buffer, RenderError> {
        match self.buffers.get(handle.0) {
            Some(GpuBuffer::Vertex(buffer)) => Ok(buffer),
            _ => Err(RenderError::UnknownHandle {
                kind: "vertex buffer",
                index: handle.0,
            }),
        }
    }

    fn index_buffer(&self, handle: BufferHandle) -> Result<&wgpu::Buffer, RenderError> {
        match self.buffers.get(handle.0) {
            Some(GpuBuffer::Index { buffer, .. }) => Ok(buffer),
            _ => Err(RenderError::UnknownHandle {
                kind: "index buffer",
                index: handle.0,
            }),
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, RenderError> {
        let device = &self.gpu.device;

        // Validation errors are caught here instead of reaching the uncaptured handler.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&self.uniform_layout],
            push_constant_ranges: &[],
        });

        let triangles = self.build_pipeline(
            &layout,
            &vertex,
            &fragment,
            wgpu::PrimitiveTopology::TriangleList,
        );
        let lines =
            self.build_pipeline(&layout, &vertex, &fragment, wgpu::PrimitiveTopology::LineList);

        if let Some(err) = pollster::block_on(self.gpu.device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile(err.to_string()));
        }

        self.programs.push(GpuProgram {
            triangles,
            lines,
            state: ProgramState::default(),
        });
        log::debug!("Compiled scene program #{}", self.programs.len() - 1);
        Ok(ProgramHandle(self.programs.len() - 1))
    }

    fn upload_vertex_attribute(
        &mut self,
        program: ProgramHandle,
        name: &str,
        data: &[f32],
        components: u32,
    ) -> Result<BufferHandle, RenderError> {
        validate_attribute_data(name, data, components)?;
        AttributeSlot::from_name(name)?;
        self.program_mut(program)?;

        self.gpu
            .device
            .push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(name),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        if let Some(err) = pollster::block_on(self.gpu.device.pop_error_scope()) {
            return Err(RenderError::BufferAllocation(err.to_string()));
        }

        let handle = BufferHandle(self.buffers.len());
        self.buffers.push(GpuBuffer::Vertex(buffer));
        self.program_mut(program)?.state.bind(name, handle)?;
        Ok(handle)
    }

    fn bind_vertex_attribute(
        &mut self,
        program: ProgramHandle,
        name: &str,
        buffer: BufferHandle,
    ) -> Result<(), RenderError> {
        self.vertex_buffer(buffer)?;
        self.program_mut(program)?.state.bind(name, buffer)
    }

    fn upload_index_buffer(&mut self, indices: &[u16]) -> Result<BufferHandle, RenderError> {
        if indices.is_empty() {
            return Err(RenderError::BufferAllocation(
                "index buffer is empty".to_string(),
            ));
        }

        self.gpu
            .device
            .push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        if let Some(err) = pollster::block_on(self.gpu.device.pop_error_scope()) {
            return Err(RenderError::BufferAllocation(err.to_string()));
        }

        self.buffers.push(GpuBuffer::Index {
            buffer,
            len: indices.len() as u32,
        });
        Ok(BufferHandle(self.buffers.len() - 1))
    }

    fn set_uniform_mat4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Mat4,
    ) -> Result<(), RenderError> {
        self.program_mut(program)?.state.set_mat4(name, value)
    }

    fn set_uniform_vec3(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Vec3,
    ) -> Result<(), RenderError> {
        self.program_mut(program)?.state.set_vec3(name, value)
    }

    fn set_uniform_bool(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: bool,
    ) -> Result<(), RenderError> {
        self.program_mut(program)?.state.set_bool(name, value)
    }

    fn begin_frame(&mut self, clear_color: Color) {
        self.frame.clear();
        self.clear_color = clear_color.into();
    }

    fn draw_indexed_triangles(
        &mut self,
        program: ProgramHandle,
        index_buffer: BufferHandle,
        count: u32,
    ) -> Result<(), RenderError> {
        self.queue_draw(program, index_buffer, count, false)
    }

    fn draw_indexed_lines(
        &mut self,
        program: ProgramHandle,
        index_buffer: BufferHandle,
        count: u32,
    ) -> Result<(), RenderError> {
        self.queue_draw(program, index_buffer, count, true)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let draws = std::mem::take(&mut self.frame);

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.ensure_depth_size();
        let stride = self.ensure_uniform_capacity(draws.len());

        if !draws.is_empty() {
            let mut bytes = vec![0u8; stride * draws.len()];
            for (i, draw) in draws.iter().enumerate() {
                let offset = i * stride;
                bytes[offset..offset + std::mem::size_of::<SceneUniforms>()]
                    .copy_from_slice(bytemuck::bytes_of(&draw.uniforms));
            }
            self.gpu.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (i, draw) in draws.iter().enumerate() {
                let program = &self.programs[draw.program.0];
                let pipeline = if draw.lines {
                    &program.lines
                } else {
                    &program.triangles
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[(i * stride) as u32]);

                for (slot, handle) in draw.attributes.iter().enumerate() {
                    let buffer = self.vertex_buffer(*handle)?;
                    render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                render_pass.set_index_buffer(
                    self.index_buffer(draw.index_buffer)?.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                render_pass.draw_indexed(0..draw.count, 0, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Byte distance between uniform snapshots, rounded up to the device's offset alignment.
fn uniform_stride(device: &wgpu::Device) -> usize {
    let align = device.limits().min_uniform_buffer_offset_alignment as usize;
    align_up(std::mem::size_of::<SceneUniforms>(), align)
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let size = (uniform_stride(device) * capacity) as u64;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Uniforms"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scene Uniform Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<SceneUniforms>() as u64),
            }),
        }],
    });

    (buffer, bind_group)
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Round `value` up to the next multiple of `align` (a power of two).
fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_offset_alignment() {
        assert_eq!(align_up(288, 256), 512);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(1, 64), 64);
    }
}
