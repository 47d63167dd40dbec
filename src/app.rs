use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::backend::WgpuBackend;
use crate::color::Color;
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::input::InputController;
use crate::renderer::{RenderOptions, Renderer};
use crate::state::SceneState;

/// Configuration for the app window and renderer.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub show_axes: bool,
    pub clear_color: Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Parlour".to_string(),
            width: 800,
            height: 600,
            show_axes: false,
            clear_color: Color::BLACK,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Draw the world axes under the furniture.
    pub fn show_axes(mut self, show: bool) -> Self {
        self.show_axes = show;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_axes: self.show_axes,
            clear_color: self.clear_color,
            ..RenderOptions::default()
        }
    }
}

/// Open the room in a window with the default configuration.
///
/// Blocks until the window is closed.
pub fn run() -> Result<(), RenderError> {
    run_with_config(AppConfig::default())
}

/// Open the room in a window.
///
/// # Example
/// ```no_run
/// parlour::run_with_config(
///     parlour::AppConfig::new().title("Living room").size(1280, 720),
/// )?;
/// # Ok::<(), parlour::RenderError>(())
/// ```
pub fn run_with_config(config: AppConfig) -> Result<(), RenderError> {
    let event_loop = EventLoop::new()?;
    // Nothing animates; frames are drawn on input and expose only.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = ParlourApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        ParlourApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum ParlourApp {
    Pending {
        config: AppConfig,
    },
    Running {
        window: Arc<Window>,
        backend: WgpuBackend,
        renderer: Renderer,
        input: InputController,
        state: SceneState,
    },
    Failed(RenderError),
}

impl ParlourApp {
    fn start(config: &AppConfig, event_loop: &ActiveEventLoop) -> Result<Self, RenderError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let aspect = gpu.aspect();

        let mut backend = WgpuBackend::new(gpu);
        let renderer = Renderer::new(&mut backend, aspect, &config.render_options())?;

        Ok(ParlourApp::Running {
            window,
            backend,
            renderer,
            input: InputController::new(),
            state: SceneState::new(),
        })
    }
}

impl ApplicationHandler for ParlourApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ParlourApp::Pending { config } = self else {
            return;
        };

        match ParlourApp::start(config, event_loop) {
            Ok(running) => {
                *self = running;
                if let ParlourApp::Running { window, .. } = self {
                    window.request_redraw();
                }
            }
            Err(err) => {
                log::error!("Failed to start: {err}");
                *self = ParlourApp::Failed(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ParlourApp::Running {
            window,
            backend,
            renderer,
            input,
            state,
        } = self
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                backend.resize(size.width, size.height);
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                redraw(window, backend, renderer, state);
            }
            WindowEvent::KeyboardInput { .. } => {
                if input.handle_event(&event, state) {
                    redraw(window, backend, renderer, state);
                }
            }
            _ => {}
        }
    }
}

/// Draws one frame. Failures abandon the frame and are logged.
fn redraw(
    window: &Window,
    backend: &mut WgpuBackend,
    renderer: &mut Renderer,
    state: &SceneState,
) {
    match renderer.render_frame(backend, state) {
        Ok(_) => {}
        Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
            log::warn!("Surface lost or outdated, reconfiguring");
            backend.gpu.reconfigure();
            window.request_redraw();
        }
        Err(err) => log::error!("Failed to draw frame: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_feeds_render_options() {
        let config = AppConfig::new()
            .title("Den")
            .size(1024, 768)
            .show_axes(true)
            .clear_color(Color::WHITE);

        assert_eq!(config.title, "Den");
        assert_eq!((config.width, config.height), (1024, 768));

        let options = config.render_options();
        assert!(options.show_axes);
        assert_eq!(options.clear_color, Color::WHITE);
        assert_eq!(options.camera, RenderOptions::default().camera);
    }
}
