use bytemuck::{Pod, Zeroable};

use crate::transform::TransformUniforms;

/// Constant buffer contents, register `b0`.
///
/// Replaced whole every frame through a write-discard map. The HLSL side
/// declares both matrices `row_major`, so the rows go up as stored.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Constants {
    pub view: [f32; 16],
    /// Identity in flat mode.
    pub projection: [f32; 16],
}

impl Constants {
    pub fn from_uniforms(uniforms: &TransformUniforms) -> Self {
        Self {
            view: uniforms.view.to_array(),
            projection: uniforms.projection_or_identity().to_array(),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// `"11.0"` style name for a raw `D3D_FEATURE_LEVEL` value.
pub fn feature_level_name(raw: i32) -> String {
    format!("{}.{}", (raw >> 12) & 0xf, (raw >> 8) & 0xf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DepthConvention;
    use crate::config::RenderMode;
    use crate::math::Mat4;

    #[test]
    fn block_is_two_matrices_and_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<Constants>(), 128);
        assert_eq!(std::mem::size_of::<Constants>() % 16, 0);
        assert_eq!(std::mem::offset_of!(Constants, projection), 64);
    }

    #[test]
    fn flat_mode_uploads_identity_projection() {
        let u = TransformUniforms::compute(RenderMode::Flat, 0.5, 0.0, DepthConvention::ZeroToOne);
        let c = Constants::from_uniforms(&u);
        assert_eq!(c.projection, Mat4::IDENTITY.to_array());
        assert_eq!(c.view, u.view.to_array());
    }

    #[test]
    fn view_bytes_come_first() {
        let u = TransformUniforms::compute(RenderMode::Cube, 1.0, 0.3, DepthConvention::ZeroToOne);
        let c = Constants::from_uniforms(&u);
        let bytes = c.as_bytes();
        assert_eq!(bytes.len(), 128);
        assert_eq!(&bytes[..64], bytemuck::cast_slice::<f32, u8>(&c.view));
    }

    #[test]
    fn feature_levels_read_as_versions() {
        assert_eq!(feature_level_name(0xb000), "11.0");
        assert_eq!(feature_level_name(0xb100), "11.1");
        assert_eq!(feature_level_name(0xa000), "10.0");
    }
}
