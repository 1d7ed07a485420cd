//! Texture decoding and sampler state.
//!
//! The image is decoded once on the CPU, uploaded to every backend, then
//! dropped.

mod decode;
mod sampler;

pub use decode::TextureImage;
pub use sampler::{AddressMode, Filter, SamplerDesc};
