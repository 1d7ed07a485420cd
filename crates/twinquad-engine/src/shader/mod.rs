//! Shader source loading.
//!
//! Compilation happens inside each backend's `build_program`; this module
//! only locates and reads the text.

mod source;

pub use source::{ShaderSource, ShaderSources};
