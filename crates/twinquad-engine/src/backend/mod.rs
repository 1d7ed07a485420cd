//! Graphics backends.
//!
//! Each backend owns one GPU context bound to one window and runs the same
//! setup and per-frame steps through `RenderBackend`. The runtime drives them
//! one after the other inside a single loop iteration.

use std::fmt;

use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use crate::config::RenderMode;
use crate::error::{RenderError, RenderResult};
use crate::geometry::Mesh;
use crate::shader::ShaderSources;
use crate::texture::{SamplerDesc, TextureImage};
use crate::transform::TransformUniforms;

pub mod d3d11;
mod frame;
pub mod gl;

pub use frame::{prepare, run_frame, BackendState};

/// Graphics API behind a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BackendKind {
    OpenGl,
    Direct3d11,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::OpenGl => f.write_str("OpenGL"),
            BackendKind::Direct3d11 => f.write_str("Direct3D 11"),
        }
    }
}

impl BackendKind {
    /// Whether this backend can run on the current platform.
    pub fn is_supported(self) -> bool {
        match self {
            BackendKind::OpenGl => true,
            BackendKind::Direct3d11 => cfg!(windows),
        }
    }
}

/// Clip-space depth range a backend expects from its projection.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DepthConvention {
    /// OpenGL: z in [-1, 1].
    NegativeOneToOne,
    /// Direct3D: z in [0, 1].
    ZeroToOne,
}

/// Per-backend startup options.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BackendOptions {
    pub mode: RenderMode,
    pub clear_color: [f32; 4],
}

/// One graphics API driving one window.
///
/// Setup calls (`build_program`, `upload_geometry`, `upload_texture`) run
/// once; the per-frame calls run every loop iteration afterwards.
pub trait RenderBackend {
    fn kind(&self) -> BackendKind;

    fn depth_convention(&self) -> DepthConvention;

    /// Client area captured at startup, in physical pixels.
    fn client_size(&self) -> (u32, u32);

    /// Compiles and links the program. Compiler output is returned on failure.
    fn build_program(&mut self, sources: &ShaderSources) -> RenderResult<()>;

    /// Uploads the vertex list once. Rejects a mesh that does not fit the mode.
    fn upload_geometry(&mut self, mesh: &Mesh) -> RenderResult<()>;

    /// Uploads the texture once. The caller may drop `image` afterwards.
    fn upload_texture(&mut self, image: &TextureImage, sampler: SamplerDesc) -> RenderResult<()>;

    /// Replaces this frame's view (and projection) matrices.
    fn update_transform(&mut self, uniforms: &TransformUniforms) -> RenderResult<()>;

    /// Clears, binds and issues the single draw.
    fn render_frame(&mut self) -> RenderResult<()>;

    /// Presents with vsync. Blocks until the display is ready.
    fn present(&mut self) -> RenderResult<()>;

    /// Releases every GPU object. Safe to call more than once.
    fn shutdown(&mut self);
}

/// Creates the window and backend for `kind`.
///
/// The backend must be dropped before the window it renders into.
pub fn create_backend(
    event_loop: &ActiveEventLoop,
    kind: BackendKind,
    attributes: WindowAttributes,
    options: BackendOptions,
) -> RenderResult<(Window, Box<dyn RenderBackend>)> {
    match kind {
        BackendKind::OpenGl => {
            let (window, backend) = gl::GlBackend::new(event_loop, attributes, options)?;
            Ok((window, Box::new(backend)))
        }
        BackendKind::Direct3d11 => create_d3d11(event_loop, attributes, options),
    }
}

#[cfg(windows)]
fn create_d3d11(
    event_loop: &ActiveEventLoop,
    attributes: WindowAttributes,
    options: BackendOptions,
) -> RenderResult<(Window, Box<dyn RenderBackend>)> {
    let window = event_loop
        .create_window(attributes)
        .map_err(|e| RenderError::Window(e.to_string()))?;
    let backend = d3d11::D3d11Backend::new(&window, options)?;
    Ok((window, Box::new(backend)))
}

#[cfg(not(windows))]
fn create_d3d11(
    _event_loop: &ActiveEventLoop,
    _attributes: WindowAttributes,
    _options: BackendOptions,
) -> RenderResult<(Window, Box<dyn RenderBackend>)> {
    Err(RenderError::BackendUnavailable(BackendKind::Direct3d11))
}
