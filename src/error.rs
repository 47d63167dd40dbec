//! Error type shared by the renderer, the backends and the application shell.
//!
//! Every fallible operation in Parlour returns [`RenderError`]. Initialization errors
//! abort startup; errors raised while drawing abort the current frame only.

/// Errors raised while setting up or drawing the room.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The vertex/fragment program failed validation.
    #[error("Failed to compile shader program: {0}")]
    ShaderCompile(String),

    /// The program has no uniform with this name (or it has a different type).
    #[error("Failed to get the storage location of uniform '{0}'")]
    UniformLookup(String),

    /// The program has no vertex attribute with this name.
    #[error("Failed to get the storage location of attribute '{0}'")]
    AttributeLookup(String),

    /// A vertex or index buffer could not be created.
    #[error("Failed to create the buffer object: {0}")]
    BufferAllocation(String),

    /// A handle that was not issued by this backend.
    #[error("Unknown {kind} handle #{index}")]
    UnknownHandle { kind: &'static str, index: usize },

    /// A shelf unit needs at least one slab.
    #[error("Shelf unit needs at least one shelf, got {0}")]
    InvalidShelfCount(u32),

    /// No GPU adapter is compatible with the window surface.
    #[error("Failed to find a suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The logical device could not be created.
    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The surface advertises no texture format or no alpha mode for this adapter.
    #[error("Surface supports no {0}")]
    UnsupportedSurface(&'static str),

    /// The window surface could not be created.
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// The next swapchain texture could not be acquired.
    #[error("Failed to acquire the next frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// The window could not be created.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop could not be created or exited with an error.
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
