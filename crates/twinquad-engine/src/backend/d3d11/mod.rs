//! Direct3D 11 backend.
//!
//! Only the constant block layout builds on every platform; the device and
//! renderer exist on Windows only.

mod constants;
#[cfg(windows)]
mod device;
#[cfg(windows)]
mod renderer;

pub use constants::{feature_level_name, Constants};
#[cfg(windows)]
pub use device::D3d11Device;
#[cfg(windows)]
pub use renderer::D3d11Backend;
