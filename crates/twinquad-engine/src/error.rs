use std::path::PathBuf;

use crate::backend::BackendKind;
use crate::config::RenderMode;

/// Convenience result type used across the engine.
pub type RenderResult<T> = Result<T, RenderError>;

/// Pipeline stage a shader compile error belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Every way setup or a frame can fail.
///
/// None of these are recovered from; they travel up to `main`, get logged and
/// end the process.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// Window creation failed.
    #[error("window creation failed: {0}")]
    Window(String),

    /// Pixel format, context or swap chain setup failed.
    #[error("surface setup failed: {0}")]
    Surface(String),

    /// GPU device or resource creation failed.
    #[error("{backend} device error: {message}")]
    Device {
        backend: BackendKind,
        message: String,
    },

    /// A required API entry point could not be resolved.
    #[error("entry point `{0}` is not available")]
    EntryPoint(String),

    /// Shader source file could not be read.
    #[error("failed to read shader source {}", path.display())]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A shader stage failed to compile; `log` is the compiler output.
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// The stages compiled but did not link into a program.
    #[error("program failed to link:\n{log}")]
    ProgramLink { log: String },

    /// The texture file is missing or could not be decoded.
    #[error("failed to decode image {}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Vertex data does not match what the render mode draws.
    #[error(
        "{mode:?} geometry expects {expected_vertices} vertices of stride {expected_stride}, got {vertices} of stride {stride}"
    )]
    GeometryMismatch {
        mode: RenderMode,
        expected_vertices: usize,
        expected_stride: usize,
        vertices: usize,
        stride: usize,
    },

    /// The backend cannot run on this platform.
    #[error("{0} backend is not available on this platform")]
    BackendUnavailable(BackendKind),

    /// A call was made before the resource it needs exists.
    #[error("{backend}: {what} used before it was created")]
    NotReady {
        backend: BackendKind,
        what: &'static str,
    },
}

impl RenderError {
    pub fn device(backend: BackendKind, message: impl Into<String>) -> Self {
        Self::Device {
            backend,
            message: message.into(),
        }
    }

    pub fn surface(message: impl Into<String>) -> Self {
        Self::Surface(message.into())
    }
}
