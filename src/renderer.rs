//! The room renderer: draw primitives and the per-frame scene composer.
//!
//! [`Renderer`] owns the handles it created on a [`RenderBackend`] (one program, the
//! shared cube and axis geometry, one color buffer per tint) and draws through any
//! backend passed to it. View, projection and light uniforms are written once in
//! [`Renderer::new`]; each cube draw writes only the model and normal matrices.

use std::collections::HashMap;

use glam::Mat4;

use crate::backend::{BufferHandle, ProgramHandle, RenderBackend, attribute, uniform};
use crate::camera::Camera;
use crate::color::Color;
use crate::error::RenderError;
use crate::lighting::{Light, normal_matrix};
use crate::matrix_stack::TransformStack;
use crate::mesh::{AxisBuffers, AxisMesh, CubeBuffers, CubeMesh};
use crate::room::room_layout;
use crate::state::SceneState;

const VERTEX_SHADER: &str = include_str!("shaders/scene_vs.wgsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/scene_fs.wgsl");

/// Settings fixed for the lifetime of a [`Renderer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Draw white lines along the world axes before the furniture.
    pub show_axes: bool,
    pub clear_color: Color,
    pub camera: Camera,
    pub light: Light,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_axes: false,
            clear_color: Color::BLACK,
            camera: Camera::default(),
            light: Light::default(),
        }
    }
}

pub struct Renderer {
    program: ProgramHandle,
    cube: CubeBuffers,
    axes: AxisBuffers,
    tints: HashMap<[u32; 3], BufferHandle>,
    stack: TransformStack,
    show_axes: bool,
    clear_color: Color,
}

impl Renderer {
    /// Compiles the scene program, uploads the static meshes and writes the camera and
    /// light uniforms.
    ///
    /// The per-draw uniforms get identity and unlit defaults here, so a program missing
    /// any of the seven uniforms fails before the first frame.
    ///
    /// `aspect` is the surface aspect ratio; the projection is not updated afterwards.
    pub fn new<B: RenderBackend>(
        backend: &mut B,
        aspect: f32,
        options: &RenderOptions,
    ) -> Result<Self, RenderError> {
        let program = backend.compile_program(VERTEX_SHADER, FRAGMENT_SHADER)?;

        let axes = AxisMesh::upload(backend, program)?;
        let cube = CubeMesh::upload(backend, program)?;

        backend.set_uniform_vec3(program, uniform::LIGHT_COLOR, options.light.color.to_vec3())?;
        backend.set_uniform_vec3(program, uniform::LIGHT_DIRECTION, options.light.direction)?;
        backend.set_uniform_mat4(program, uniform::VIEW_MATRIX, options.camera.view_matrix())?;
        backend.set_uniform_mat4(
            program,
            uniform::PROJ_MATRIX,
            options.camera.projection_matrix(aspect),
        )?;
        backend.set_uniform_mat4(program, uniform::MODEL_MATRIX, Mat4::IDENTITY)?;
        backend.set_uniform_mat4(program, uniform::NORMAL_MATRIX, Mat4::IDENTITY)?;
        backend.set_uniform_bool(program, uniform::IS_LIGHTING, false)?;

        log::info!(
            "Renderer ready (aspect {aspect:.3}, fov {}°, axes {})",
            options.camera.fov_degrees,
            if options.show_axes { "on" } else { "off" }
        );

        Ok(Self {
            program,
            cube,
            axes,
            tints: HashMap::new(),
            stack: TransformStack::new(),
            show_axes: options.show_axes,
            clear_color: options.clear_color,
        })
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Draws the unit cube transformed by `model` and tinted with `color`.
    ///
    /// The normal matrix is recomputed from `model` on every call.
    pub fn draw_cube<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        model: Mat4,
        color: Color,
    ) -> Result<(), RenderError> {
        let colors = self.tint_buffer(backend, color)?;

        backend.bind_vertex_attribute(self.program, attribute::POSITION, self.cube.positions)?;
        backend.bind_vertex_attribute(self.program, attribute::COLOR, colors)?;
        backend.bind_vertex_attribute(self.program, attribute::NORMAL, self.cube.normals)?;

        backend.set_uniform_mat4(self.program, uniform::MODEL_MATRIX, model)?;
        backend.set_uniform_mat4(self.program, uniform::NORMAL_MATRIX, normal_matrix(model))?;

        backend.draw_indexed_triangles(self.program, self.cube.indices, CubeMesh::INDEX_COUNT)
    }

    /// Draws the debug axes with an identity model matrix.
    pub fn draw_axes<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), RenderError> {
        backend.bind_vertex_attribute(self.program, attribute::POSITION, self.axes.positions)?;
        backend.bind_vertex_attribute(self.program, attribute::COLOR, self.axes.colors)?;
        backend.bind_vertex_attribute(self.program, attribute::NORMAL, self.axes.normals)?;

        backend.set_uniform_mat4(self.program, uniform::MODEL_MATRIX, Mat4::IDENTITY)?;
        backend.draw_indexed_lines(self.program, self.axes.indices, AxisMesh::INDEX_COUNT)
    }

    /// Draws the whole room for `state` and presents it.
    ///
    /// Returns the number of cubes drawn. On error the frame is abandoned without being
    /// presented.
    pub fn render_frame<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        state: &SceneState,
    ) -> Result<usize, RenderError> {
        backend.begin_frame(self.clear_color);

        backend.set_uniform_bool(self.program, uniform::IS_LIGHTING, false)?;
        if self.show_axes {
            self.draw_axes(backend)?;
        }
        backend.set_uniform_bool(self.program, uniform::IS_LIGHTING, true)?;

        let mut current = scene_rotation(state);
        let mut cubes = 0;

        for furniture in room_layout(state.chair_slide())? {
            for instance in furniture.instances() {
                self.stack.push(current);
                current *= instance.local_transform;
                let drawn = self.draw_cube(backend, current, instance.color);
                current = self.stack.pop();
                drawn?;
                cubes += 1;
            }
            debug_assert!(
                self.stack.is_empty(),
                "{} left {} matrices on the stack",
                furniture.name,
                self.stack.depth()
            );
        }

        backend.present()?;
        log::debug!("Presented frame with {cubes} cubes");
        Ok(cubes)
    }

    /// Returns the per-vertex color buffer for `color`, uploading it on first use.
    fn tint_buffer<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        color: Color,
    ) -> Result<BufferHandle, RenderError> {
        if let Some(&buffer) = self.tints.get(&color.key()) {
            return Ok(buffer);
        }
        let buffer = backend.upload_vertex_attribute(
            self.program,
            attribute::COLOR,
            &CubeMesh::colors(color),
            3,
        )?;
        self.tints.insert(color.key(), buffer);
        Ok(buffer)
    }
}

/// Global rotation applied to the whole room, x then y then z.
pub fn scene_rotation(state: &SceneState) -> Mat4 {
    Mat4::from_rotation_x(state.x_angle().to_radians())
        * Mat4::from_rotation_y(state.y_angle().to_radians())
        * Mat4::from_rotation_z(state.z_angle().to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    use crate::backend::{RecordingBackend, Topology};
    use crate::state::SceneAction;

    fn setup(options: &RenderOptions) -> (RecordingBackend, Renderer) {
        let mut backend = RecordingBackend::new();
        let renderer = Renderer::new(&mut backend, 4.0 / 3.0, options).unwrap();
        (backend, renderer)
    }

    #[test]
    fn frame_draws_every_cube_lit() {
        let (mut backend, mut renderer) = setup(&RenderOptions::default());

        let cubes = renderer.render_frame(&mut backend, &SceneState::default()).unwrap();

        assert_eq!(cubes, 71);
        let frame = backend.last_frame();
        assert_eq!(frame.len(), 71);
        assert!(frame.iter().all(|d| d.is_lit()));
        assert!(frame.iter().all(|d| d.topology == Topology::Triangles && d.count == 36));
        assert_eq!(backend.clear_color(), Some(Color::BLACK));
        assert_eq!(backend.frames_presented(), 1);
    }

    #[test]
    fn axes_are_drawn_unlit_first() {
        let options = RenderOptions {
            show_axes: true,
            ..Default::default()
        };
        let (mut backend, mut renderer) = setup(&options);

        renderer.render_frame(&mut backend, &SceneState::default()).unwrap();

        let frame = backend.last_frame();
        assert_eq!(frame.len(), 72);
        assert_eq!(frame[0].topology, Topology::Lines);
        assert_eq!(frame[0].count, 6);
        assert!(!frame[0].is_lit());
        assert_eq!(frame[0].model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn camera_and_light_are_set_once() {
        let options = RenderOptions::default();
        let (backend, renderer) = setup(&options);

        let uniforms = backend.uniforms(renderer.program()).unwrap();
        assert_eq!(
            Mat4::from_cols_array_2d(&uniforms.view),
            options.camera.view_matrix()
        );
        assert_eq!(
            Mat4::from_cols_array_2d(&uniforms.proj),
            options.camera.projection_matrix(4.0 / 3.0)
        );
        assert_eq!(uniforms.light_color, [1.0, 1.0, 1.0]);
        assert_eq!(
            Vec3::from_array(uniforms.light_direction),
            Vec3::new(0.5, 3.0, 4.0).normalize()
        );
    }

    #[test]
    fn draw_cube_writes_inverse_transpose() {
        let (mut backend, mut renderer) = setup(&RenderOptions::default());
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));

        backend.begin_frame(Color::BLACK);
        renderer
            .draw_cube(&mut backend, model, Color::rgb8(250, 248, 220))
            .unwrap();

        let draw = &backend.pending()[0];
        assert_eq!(draw.model_matrix(), model);
        assert!(
            draw.normal_matrix()
                .abs_diff_eq(model.inverse().transpose(), 1e-6)
        );
    }

    #[test]
    fn tint_buffers_are_reused() {
        let (mut backend, mut renderer) = setup(&RenderOptions::default());

        renderer.render_frame(&mut backend, &SceneState::default()).unwrap();
        let after_first = backend.buffer_count();
        renderer.render_frame(&mut backend, &SceneState::default()).unwrap();

        assert_eq!(backend.buffer_count(), after_first);

        let first = &backend.last_frame()[0];
        let colors = backend.vertex_data(first.attributes[1]).unwrap();
        assert_eq!(colors.len(), 72);
        assert_eq!(&colors[..3], &Color::rgb8(250, 248, 220).to_array());
    }

    #[test]
    fn every_uniform_is_required_at_startup() {
        let required = [
            uniform::MODEL_MATRIX,
            uniform::NORMAL_MATRIX,
            uniform::VIEW_MATRIX,
            uniform::PROJ_MATRIX,
            uniform::LIGHT_COLOR,
            uniform::LIGHT_DIRECTION,
            uniform::IS_LIGHTING,
        ];
        for missing in required {
            let mut backend = RecordingBackend::new().without_uniform(missing);

            let result = Renderer::new(&mut backend, 4.0 / 3.0, &RenderOptions::default());

            assert!(
                matches!(&result, Err(RenderError::UniformLookup(name)) if name == missing),
                "{missing} was not reported"
            );
            assert_eq!(backend.frames_presented(), 0);
        }
    }

    #[test]
    fn scene_rotation_turns_every_cube() {
        let (mut backend, mut renderer) = setup(&RenderOptions::default());
        renderer.render_frame(&mut backend, &SceneState::default()).unwrap();
        let still: Vec<Mat4> = backend.last_frame().iter().map(|d| d.model_matrix()).collect();

        let mut state = SceneState::default();
        for _ in 0..30 {
            state.apply(SceneAction::RotateYPositive);
        }
        renderer.render_frame(&mut backend, &state).unwrap();

        let turn = Mat4::from_rotation_y(90f32.to_radians());
        for (before, draw) in still.iter().zip(backend.last_frame()) {
            assert!(draw.model_matrix().abs_diff_eq(turn * *before, 1e-4));
        }
    }
}
