//! Matrix math shared by both backends.
//!
//! Convention: row vectors, row-major storage, `A * B` applies `A` first.

mod mat4;

pub use mat4::{Mat4, OrthoBounds};
