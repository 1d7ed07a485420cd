use std::path::Path;

use crate::error::{RenderError, RenderResult};

/// Decoded RGBA8 image, rows top to bottom as stored in the file.
///
/// Lives only until every backend has uploaded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Bytes per pixel after decode.
    pub const CHANNELS: u32 = 4;

    /// Decodes any format the `image` crate recognises, sniffing the content
    /// rather than trusting the extension.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let decode_err = |source: image::ImageError| RenderError::ImageDecode {
            path: path.to_path_buf(),
            source,
        };

        let reader = image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?;
        let rgba = reader.decode().map_err(decode_err)?.to_rgba8();

        let (width, height) = rgba.dimensions();
        log::debug!("decoded {} ({width}x{height})", path.display());

        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Wraps an RGBA8 buffer. Returns `None` for an empty image or when the
    /// length does not match.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let expected = width as usize * height as usize * Self::CHANNELS as usize;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        Self::CHANNELS
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes per buffer row.
    #[inline]
    pub fn row_pitch(&self) -> u32 {
        self.width * Self::CHANNELS
    }

    /// Texel at column `x`, row `y` (row 0 is the first buffer row).
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS as usize;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[i..i + 4]);
        out
    }
}
