//! Rendering backend abstraction.
//!
//! The renderer never talks to a graphics API directly. It drives a [`RenderBackend`],
//! a small GL-style state machine: compile a program, upload attribute and index
//! buffers, set named uniforms, issue indexed draws, present.
//!
//! # Implementations
//!
//! - [`WgpuBackend`]: draws to a window surface through wgpu. Draw calls are recorded
//!   with a snapshot of the program's uniforms and replayed in a single render pass on
//!   [`present`](RenderBackend::present).
//! - [`RecordingBackend`]: headless; keeps every draw and its uniforms in memory for
//!   inspection.
//!
//! # Program interface
//!
//! Both backends expose the same fixed set of names:
//!
//! | Kind      | Name                  | Type   |
//! |-----------|-----------------------|--------|
//! | attribute | `a_position`          | vec3   |
//! | attribute | `a_color`             | vec3   |
//! | attribute | `a_normal`            | vec3   |
//! | uniform   | `u_model_matrix`      | mat4   |
//! | uniform   | `u_normal_matrix`     | mat4   |
//! | uniform   | `u_view_matrix`       | mat4   |
//! | uniform   | `u_proj_matrix`       | mat4   |
//! | uniform   | `u_light_color`       | vec3   |
//! | uniform   | `u_light_direction`   | vec3   |
//! | uniform   | `u_is_lighting`       | bool   |

mod recording;
mod wgpu_backend;

pub use recording::{DrawRecord, RecordingBackend, Topology};
pub use wgpu_backend::WgpuBackend;

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::error::RenderError;

/// Vertex attribute names.
pub mod attribute {
    pub const POSITION: &str = "a_position";
    pub const COLOR: &str = "a_color";
    pub const NORMAL: &str = "a_normal";
}

/// Uniform names.
pub mod uniform {
    pub const MODEL_MATRIX: &str = "u_model_matrix";
    pub const NORMAL_MATRIX: &str = "u_normal_matrix";
    pub const VIEW_MATRIX: &str = "u_view_matrix";
    pub const PROJ_MATRIX: &str = "u_proj_matrix";
    pub const LIGHT_COLOR: &str = "u_light_color";
    pub const LIGHT_DIRECTION: &str = "u_light_direction";
    pub const IS_LIGHTING: &str = "u_is_lighting";
}

/// Handle to a compiled vertex/fragment program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) usize);

/// Handle to a vertex attribute or index buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) usize);

/// The operations the renderer needs from a graphics API.
pub trait RenderBackend {
    /// Compiles and links a vertex/fragment program pair.
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, RenderError>;

    /// Uploads static per-vertex float data and binds it to the named attribute.
    fn upload_vertex_attribute(
        &mut self,
        program: ProgramHandle,
        name: &str,
        data: &[f32],
        components: u32,
    ) -> Result<BufferHandle, RenderError>;

    /// Binds a previously uploaded buffer to the named attribute.
    fn bind_vertex_attribute(
        &mut self,
        program: ProgramHandle,
        name: &str,
        buffer: BufferHandle,
    ) -> Result<(), RenderError>;

    /// Uploads static triangle or line indices.
    fn upload_index_buffer(&mut self, indices: &[u16]) -> Result<BufferHandle, RenderError>;

    fn set_uniform_mat4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Mat4,
    ) -> Result<(), RenderError>;

    fn set_uniform_vec3(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Vec3,
    ) -> Result<(), RenderError>;

    fn set_uniform_bool(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: bool,
    ) -> Result<(), RenderError>;

    /// Starts a new frame; color and depth are cleared when the frame is presented.
    fn begin_frame(&mut self, clear_color: Color);

    /// Draws `count` indices from `index_buffer` as a triangle list.
    fn draw_indexed_triangles(
        &mut self,
        program: ProgramHandle,
        index_buffer: BufferHandle,
        count: u32,
    ) -> Result<(), RenderError>;

    /// Draws `count` indices from `index_buffer` as a line list.
    fn draw_indexed_lines(
        &mut self,
        program: ProgramHandle,
        index_buffer: BufferHandle,
        count: u32,
    ) -> Result<(), RenderError>;

    /// Finishes the frame started by [`begin_frame`](Self::begin_frame).
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Uniform block shared by the vertex shader and both backends.
///
/// Field order and padding match the `Uniforms` struct in `shaders/scene_vs.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub light_color: [f32; 3],
    pub is_lighting: u32,
    pub light_direction: [f32; 3],
    pub _padding: f32,
}

impl Default for SceneUniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model: identity,
            normal_matrix: identity,
            view: identity,
            proj: identity,
            light_color: [0.0; 3],
            is_lighting: 0,
            light_direction: [0.0; 3],
            _padding: 0.0,
        }
    }
}

/// Index of a vertex attribute's buffer slot (shader location).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AttributeSlot {
    Position = 0,
    Color = 1,
    Normal = 2,
}

impl AttributeSlot {
    pub(crate) const ALL: [AttributeSlot; 3] =
        [AttributeSlot::Position, AttributeSlot::Color, AttributeSlot::Normal];

    pub(crate) fn from_name(name: &str) -> Result<Self, RenderError> {
        match name {
            attribute::POSITION => Ok(Self::Position),
            attribute::COLOR => Ok(Self::Color),
            attribute::NORMAL => Ok(Self::Normal),
            _ => Err(RenderError::AttributeLookup(name.to_string())),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Position => attribute::POSITION,
            Self::Color => attribute::COLOR,
            Self::Normal => attribute::NORMAL,
        }
    }
}

/// Per-program state tracked identically by every backend: uniform values and the
/// buffer bound to each attribute slot.
#[derive(Clone, Debug, Default)]
pub(crate) struct ProgramState {
    pub(crate) uniforms: SceneUniforms,
    pub(crate) attributes: [Option<BufferHandle>; 3],
}

impl ProgramState {
    pub(crate) fn set_mat4(&mut self, name: &str, value: Mat4) -> Result<(), RenderError> {
        let slot = match name {
            uniform::MODEL_MATRIX => &mut self.uniforms.model,
            uniform::NORMAL_MATRIX => &mut self.uniforms.normal_matrix,
            uniform::VIEW_MATRIX => &mut self.uniforms.view,
            uniform::PROJ_MATRIX => &mut self.uniforms.proj,
            _ => return Err(RenderError::UniformLookup(name.to_string())),
        };
        *slot = value.to_cols_array_2d();
        Ok(())
    }

    pub(crate) fn set_vec3(&mut self, name: &str, value: Vec3) -> Result<(), RenderError> {
        let slot = match name {
            uniform::LIGHT_COLOR => &mut self.uniforms.light_color,
            uniform::LIGHT_DIRECTION => &mut self.uniforms.light_direction,
            _ => return Err(RenderError::UniformLookup(name.to_string())),
        };
        *slot = value.to_array();
        Ok(())
    }

    pub(crate) fn set_bool(&mut self, name: &str, value: bool) -> Result<(), RenderError> {
        match name {
            uniform::IS_LIGHTING => {
                self.uniforms.is_lighting = value as u32;
                Ok(())
            }
            _ => Err(RenderError::UniformLookup(name.to_string())),
        }
    }

    pub(crate) fn bind(&mut self, name: &str, buffer: BufferHandle) -> Result<(), RenderError> {
        let slot = AttributeSlot::from_name(name)?;
        self.attributes[slot as usize] = Some(buffer);
        Ok(())
    }

    /// Buffers bound to all three attribute slots, or the first unbound attribute.
    pub(crate) fn bound_attributes(&self) -> Result<[BufferHandle; 3], RenderError> {
        let mut bound = [BufferHandle(0); 3];
        for slot in AttributeSlot::ALL {
            bound[slot as usize] = self.attributes[slot as usize]
                .ok_or_else(|| RenderError::AttributeLookup(slot.name().to_string()))?;
        }
        Ok(bound)
    }
}

/// Rejects attribute data the pipelines cannot consume.
pub(crate) fn validate_attribute_data(
    name: &str,
    data: &[f32],
    components: u32,
) -> Result<(), RenderError> {
    if components != 3 {
        return Err(RenderError::BufferAllocation(format!(
            "attribute '{name}' expects 3 components per vertex, got {components}"
        )));
    }
    if data.is_empty() || data.len() % components as usize != 0 {
        return Err(RenderError::BufferAllocation(format!(
            "attribute '{name}' data length {} is not a positive multiple of {components}",
            data.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_shader_layout() {
        // 4 × mat4 + vec3/u32 + vec3/f32
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 288);
        assert_eq!(std::mem::offset_of!(SceneUniforms, light_color), 256);
        assert_eq!(std::mem::offset_of!(SceneUniforms, is_lighting), 268);
        assert_eq!(std::mem::offset_of!(SceneUniforms, light_direction), 272);
    }

    #[test]
    fn unknown_uniform_names_fail_lookup() {
        let mut state = ProgramState::default();
        assert!(matches!(
            state.set_mat4("u_mvp", Mat4::IDENTITY),
            Err(RenderError::UniformLookup(name)) if name == "u_mvp"
        ));
        // Right name, wrong type.
        assert!(matches!(
            state.set_vec3(uniform::MODEL_MATRIX, Vec3::ONE),
            Err(RenderError::UniformLookup(_))
        ));
        assert!(state.set_bool(uniform::IS_LIGHTING, true).is_ok());
        assert_eq!(state.uniforms.is_lighting, 1);
    }

    #[test]
    fn unbound_attribute_is_reported_by_name() {
        let mut state = ProgramState::default();
        state.bind(attribute::POSITION, BufferHandle(0)).unwrap();
        state.bind(attribute::COLOR, BufferHandle(1)).unwrap();

        match state.bound_attributes() {
            Err(RenderError::AttributeLookup(name)) => assert_eq!(name, attribute::NORMAL),
            other => panic!("expected missing normal attribute, got {other:?}"),
        }
    }

    #[test]
    fn attribute_data_must_be_whole_vertices() {
        assert!(validate_attribute_data("a_position", &[0.0; 9], 3).is_ok());
        assert!(validate_attribute_data("a_position", &[0.0; 8], 3).is_err());
        assert!(validate_attribute_data("a_position", &[], 3).is_err());
        assert!(validate_attribute_data("a_position", &[0.0; 8], 4).is_err());
    }
}
