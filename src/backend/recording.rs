//! Headless backend that records draw calls instead of rasterizing them.

use std::collections::HashSet;

use glam::{Mat4, Vec3};

use crate::backend::{
    BufferHandle, ProgramHandle, ProgramState, RenderBackend, SceneUniforms,
    validate_attribute_data,
};
use crate::color::Color;
use crate::error::RenderError;

/// Primitive topology of a recorded draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

/// One draw call with the program state it was issued under.
#[derive(Clone, Debug)]
pub struct DrawRecord {
    pub program: ProgramHandle,
    pub topology: Topology,
    pub uniforms: SceneUniforms,
    /// Buffers bound to position, color and normal at draw time.
    pub attributes: [BufferHandle; 3],
    pub index_buffer: BufferHandle,
    pub count: u32,
}

impl DrawRecord {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.uniforms.model)
    }

    pub fn normal_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.uniforms.normal_matrix)
    }

    pub fn is_lit(&self) -> bool {
        self.uniforms.is_lighting != 0
    }
}

#[derive(Clone, Debug)]
enum RecordedBuffer {
    Vertex(Vec<f32>),
    Index(Vec<u16>),
}

/// A [`RenderBackend`] that keeps everything in memory.
///
/// Useful for running the renderer without a window: after a frame is presented its
/// draws are available from [`last_frame`](Self::last_frame).
///
/// ```
/// use parlour::{RecordingBackend, Renderer, SceneState, RenderOptions};
///
/// let mut backend = RecordingBackend::new();
/// let mut renderer = Renderer::new(&mut backend, 4.0 / 3.0, &RenderOptions::default()).unwrap();
/// renderer.render_frame(&mut backend, &SceneState::default()).unwrap();
///
/// assert_eq!(backend.last_frame().len(), 71);
/// ```
#[derive(Debug, Default)]
pub struct RecordingBackend {
    programs: Vec<ProgramState>,
    buffers: Vec<RecordedBuffer>,
    missing_uniforms: HashSet<String>,
    frame: Vec<DrawRecord>,
    presented: Vec<DrawRecord>,
    frames_presented: usize,
    clear_color: Option<Color>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a program whose shader does not declare `name`.
    pub fn without_uniform(mut self, name: &str) -> Self {
        self.missing_uniforms.insert(name.to_string());
        self
    }

    /// Draws of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawRecord] {
        &self.presented
    }

    /// Draws issued since the last `begin_frame` that have not been presented yet.
    pub fn pending(&self) -> &[DrawRecord] {
        &self.frame
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }

    pub fn clear_color(&self) -> Option<Color> {
        self.clear_color
    }

    /// Current uniform values of a program.
    pub fn uniforms(&self, program: ProgramHandle) -> Option<&SceneUniforms> {
        self.programs.get(program.0).map(|p| &p.uniforms)
    }

    /// Float data of an uploaded vertex attribute buffer.
    pub fn vertex_data(&self, buffer: BufferHandle) -> Option<&[f32]> {
        match self.buffers.get(buffer.0)? {
            RecordedBuffer::Vertex(data) => Some(data),
            RecordedBuffer::Index(_) => None,
        }
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn program_mut(&mut self, program: ProgramHandle) -> Result<&mut ProgramState, RenderError> {
        self.programs.get_mut(program.0).ok_or(RenderError::UnknownHandle {
            kind: "program",
            index: program.0,
        })
    }

    fn check_uniform(&self, name: &str) -> Result<(), RenderError> {
        if self.missing_uniforms.contains(name) {
            return Err(RenderError::UniformLookup(name.to_string()));
        }
        Ok(())
    }

    fn record(
        &mut self,
        program: ProgramHandle,
        index_buffer: BufferHandle,
        count: u32,
        topology: Topology,
    ) -> Result<(), RenderError> {
        match self.buffers.get(index_buffer.0) {
            Some(RecordedBuffer::Index(indices)) if count as usize <= indices.len() => {}
            Some(RecordedBuffer::Index(indices)) => {
                return Err(RenderError::BufferAllocation(format!(
                    "draw of {count} indices from a buffer holding {}",
                    indices.len()
                )));
            }
            _ => {
                return Err(RenderError::UnknownHandle {
                    kind: "index buffer",
                    index: index_buffer.0,
                });
            }
        }

        let state = self.program_mut(program)?;
        let attributes = state.bound_attributes()?;
        let uniforms = state.uniforms;
        self.frame.push(DrawRecord {
            program,
            topology,
            uniforms,
            attributes,
            index_buffer,
            count,
        });
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, RenderError> {
        if !vertex_source.contains("@vertex") {
            return Err(RenderError::ShaderCompile(
                "vertex source has no @vertex entry point".to_string(),
            ));
        }
        if !fragment_source.contains("@fragment") {
            return Err(RenderError::ShaderCompile(
                "fragment source has no @fragment entry point".to_string(),
            ));
        }
        self.programs.push(ProgramState::default());
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
        let handle = BufferHandle(self.buffers.len());
        self.program_mut(program)?.bind(name, handle)?;
        self.buffers.push(RecordedBuffer::Vertex(data.to_vec()));
        Ok(handle)
    }

    fn bind_vertex_attribute(
        &mut self,
        program: ProgramHandle,
        name: &str,
        buffer: BufferHandle,
    ) -> Result<(), RenderError> {
        if !matches!(self.buffers.get(buffer.0), Some(RecordedBuffer::Vertex(_))) {
            return Err(RenderError::UnknownHandle {
                kind: "vertex buffer",
                index: buffer.0,
            });
        }
        self.program_mut(program)?.bind(name, buffer)
    }

    fn upload_index_buffer(&mut self, indices: &[u16]) -> Result<BufferHandle, RenderError> {
        if indices.is_empty() {
            return Err(RenderError::BufferAllocation(
                "index buffer is empty".to_string(),
            ));
        }
        self.buffers.push(RecordedBuffer::Index(indices.to_vec()));
        Ok(BufferHandle(self.buffers.len() - 1))
    }

    fn set_uniform_mat4(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Mat4,
    ) -> Result<(), RenderError> {
        self.check_uniform(name)?;
        self.program_mut(program)?.set_mat4(name, value)
    }

    fn set_uniform_vec3(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Vec3,
    ) -> Result<(), RenderError> {
        self.check_uniform(name)?;
        self.program_mut(program)?.set_vec3(name, value)
    }

    fn set_uniform_bool(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: bool,
    ) -> Result<(), RenderError> {
        self.check_uniform(name)?;
        self.program_mut(program)?.set_bool(name, value)
    }

    fn begin_frame(&mut self, clear_color: Color) {
        self.frame.clear();
        self.clear_color = Some(clear_color);
    }

    fn draw_indexed_triangles(
        &mut self,
        program: ProgramHandle,
        index_buffer: BufferHandle,
        count: u32,
    ) -> Result<(), RenderError> {
        self.record(program, index_buffer, count, Topology::Triangles)
    }

    fn draw_indexed_lines(
        &mut self,
        program: ProgramHandle,
        index_buffer: BufferHandle,
        count: u32,
    ) -> Result<(), RenderError> {
        self.record(program, index_buffer, count, Topology::Lines)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.presented = std::mem::take(&mut self.frame);
        self.frames_presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{attribute, uniform};

    const VS: &str = "@vertex fn vs_main() {}";
    const FS: &str = "@fragment fn fs_main() {}";

    #[test]
    fn compile_rejects_sources_without_entry_points() {
        let mut backend = RecordingBackend::new();
        assert!(matches!(
            backend.compile_program("fn main() {}", FS),
            Err(RenderError::ShaderCompile(_))
        ));
        assert!(backend.compile_program(VS, FS).is_ok());
    }

    #[test]
    fn draw_snapshots_current_uniforms() {
        let mut backend = RecordingBackend::new();
        let program = backend.compile_program(VS, FS).unwrap();
        for name in [attribute::POSITION, attribute::COLOR, attribute::NORMAL] {
            backend
                .upload_vertex_attribute(program, name, &[0.0; 3], 3)
                .unwrap();
        }
        let indices = backend.upload_index_buffer(&[0, 0, 0]).unwrap();

        backend.begin_frame(Color::BLACK);
        let first = Mat4::from_translation(Vec3::X);
        backend
            .set_uniform_mat4(program, uniform::MODEL_MATRIX, first)
            .unwrap();
        backend.draw_indexed_triangles(program, indices, 3).unwrap();
        backend
            .set_uniform_mat4(program, uniform::MODEL_MATRIX, Mat4::IDENTITY)
            .unwrap();
        backend.draw_indexed_lines(program, indices, 2).unwrap();
        backend.present().unwrap();

        let frame = backend.last_frame();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0].model_matrix(), first);
        assert_eq!(frame[0].topology, Topology::Triangles);
        assert_eq!(frame[1].model_matrix(), Mat4::IDENTITY);
        assert_eq!(frame[1].topology, Topology::Lines);
        assert_eq!(backend.frames_presented(), 1);
    }

    #[test]
    fn missing_uniform_is_reported() {
        let mut backend = RecordingBackend::new().without_uniform(uniform::NORMAL_MATRIX);
        let program = backend.compile_program(VS, FS).unwrap();

        assert!(
            backend
                .set_uniform_mat4(program, uniform::MODEL_MATRIX, Mat4::IDENTITY)
                .is_ok()
        );
        assert!(matches!(
            backend.set_uniform_mat4(program, uniform::NORMAL_MATRIX, Mat4::IDENTITY),
            Err(RenderError::UniformLookup(_))
        ));
    }

    #[test]
    fn draw_with_unknown_index_buffer_fails() {
        let mut backend = RecordingBackend::new();
        let program = backend.compile_program(VS, FS).unwrap();
        assert!(matches!(
            backend.draw_indexed_triangles(program, BufferHandle(7), 36),
            Err(RenderError::UnknownHandle { .. })
        ));
    }
}
