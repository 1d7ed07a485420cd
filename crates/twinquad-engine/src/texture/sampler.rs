use super::TextureImage;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AddressMode {
    ClampToEdge,
    Repeat,
}

/// Backend-neutral sampler state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SamplerDesc {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    /// Applied to U, V and (on D3D) W.
    pub address: AddressMode,
    pub mipmaps: bool,
}

impl SamplerDesc {
    /// Nearest filtering, clamped edges, no mips: every texel lands unblended.
    pub const PIXEL_EXACT: Self = Self {
        min_filter: Filter::Nearest,
        mag_filter: Filter::Nearest,
        address: AddressMode::ClampToEdge,
        mipmaps: false,
    };

    /// CPU reference of this sampler for nearest filtering.
    ///
    /// `(0, 0)` addresses the first buffer row, matching the unflipped GPU
    /// upload.
    pub fn sample(&self, image: &TextureImage, u: f32, v: f32) -> [u8; 4] {
        let x = self.texel_index(u, image.width());
        let y = self.texel_index(v, image.height());
        image.texel(x, y)
    }

    fn texel_index(&self, coord: f32, size: u32) -> u32 {
        let coord = match self.address {
            AddressMode::ClampToEdge => coord.clamp(0.0, 1.0),
            AddressMode::Repeat => coord.rem_euclid(1.0),
        };
        let max = size.saturating_sub(1);
        ((coord * size as f32).floor() as u32).min(max)
    }
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self::PIXEL_EXACT
    }
}
