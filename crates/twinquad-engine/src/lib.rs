//! Twinquad engine crate.
//!
//! Renders the same textured quad (or rotating cube) through OpenGL and
//! Direct3D 11, one window each, driven from a single event loop.

pub mod backend;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod shader;
pub mod texture;
pub mod time;
pub mod transform;
pub mod window;

pub use backend::{BackendKind, RenderBackend};
pub use config::{BackendSelection, DemoConfig, RenderMode};
pub use error::{RenderError, RenderResult};
pub use window::Runtime;
