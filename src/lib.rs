//! # Parlour
//!
//! **A furnished living room built entirely from lit unit cubes.**
//!
//! Walls, a table with four chairs, bookshelves, a TV stand, two sofas and a television
//! are each assembled from scaled cubes, placed with a save/restore transform stack and
//! shaded per vertex by one directional light. The arrow keys and `Z`/`X` turn the
//! whole room, `V`/`C` slide the chairs away from and towards the table.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), parlour::RenderError> {
//!     parlour::run_with_config(parlour::AppConfig::new().show_axes(true))
//! }
//! ```
//!
//! ## Headless rendering
//!
//! The renderer draws through the [`RenderBackend`] trait. [`WgpuBackend`] puts frames
//! on screen; [`RecordingBackend`] keeps every draw call in memory:
//!
//! ```
//! use parlour::{RecordingBackend, RenderOptions, Renderer, SceneState};
//!
//! let mut backend = RecordingBackend::new();
//! let mut renderer = Renderer::new(&mut backend, 16.0 / 9.0, &RenderOptions::default())?;
//!
//! let mut state = SceneState::new();
//! state.apply(parlour::SceneAction::SlideChairsOut);
//! let cubes = renderer.render_frame(&mut backend, &state)?;
//! assert_eq!(cubes, backend.last_frame().len());
//! # Ok::<(), parlour::RenderError>(())
//! ```
//!
//! ## Keys
//!
//! | Key        | Effect                        |
//! |------------|-------------------------------|
//! | Up / Down  | rotate about X by ±3°         |
//! | Left / Right | rotate about Y by ±3°       |
//! | Z / X      | rotate about Z by ±3°         |
//! | V / C      | chairs out / in by 0.1        |
//!
//! Set `RUST_LOG=debug` for per-frame logging.

mod app;
pub mod backend;
mod camera;
mod color;
mod error;
pub mod furniture;
mod gpu;
mod input;
pub mod lighting;
mod matrix_stack;
pub mod mesh;
mod renderer;
pub mod room;
mod state;

pub use app::{AppConfig, run, run_with_config};
pub use backend::{
    BufferHandle, DrawRecord, ProgramHandle, RecordingBackend, RenderBackend, SceneUniforms,
    Topology, WgpuBackend,
};
pub use camera::Camera;
pub use color::Color;
pub use error::RenderError;
pub use furniture::{BoxPart, Furniture, FurnitureInstance, Placement, ShelfSpec};
pub use gpu::GpuContext;
pub use input::{InputController, action_for_key, action_for_keycode};
pub use lighting::Light;
pub use matrix_stack::TransformStack;
pub use renderer::{RenderOptions, Renderer, scene_rotation};
pub use state::{SceneAction, SceneState};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3};

// Re-export the winit key type used by the input controller
pub use winit::keyboard::KeyCode;
