//! OpenGL 3.3 core backend (glutin + glow).

mod format;
mod renderer;
mod surface;

pub use format::{ConfigTraits, PixelFormatRequest};
pub use renderer::GlBackend;
pub use surface::GlSurface;
