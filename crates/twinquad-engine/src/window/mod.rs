//! Windows + runtime loop.
//!
//! Owns the `winit` EventLoop, one window per backend, and drives every
//! backend once per loop iteration.

mod runtime;

pub use runtime::Runtime;
