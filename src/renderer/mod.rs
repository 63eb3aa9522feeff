pub mod atlas;
pub mod gpu;

use glam::UVec2;
use image::RgbaImage;

use crate::error::{Result, TilemapError};
use crate::map::texel_bytes;

pub use atlas::{AtlasImage, AtlasLoader, FsAtlasLoader, MemoryAtlasLoader};
pub use gpu::{GpuParamBuffer, GpuTextureSink};

/// Destination for packed map buffers.
///
/// `data` holds `texels.x * texels.y` units of four bytes each; every unit
/// becomes one texel. Implementations copy the bytes and must not keep a
/// reference to `data`.
pub trait TextureSink {
    type Texture;

    fn upload_indices(&mut self, label: &str, texels: UVec2, data: &[u8]) -> Result<Self::Texture>;
}

// ── ImageSink ─────────────────────────────────────────────────────────────────

/// CPU bitmap sink: each packed unit becomes one RGBA8 pixel of an
/// `image::RgbaImage` (R,G = first index, B,A = second index).
#[derive(Debug, Default)]
pub struct ImageSink;

impl TextureSink for ImageSink {
    type Texture = RgbaImage;

    fn upload_indices(&mut self, label: &str, texels: UVec2, data: &[u8]) -> Result<RgbaImage> {
        let expected = texel_bytes(texels)
            .ok_or(TilemapError::Allocation { what: "index bitmap", bytes: usize::MAX })?;
        if data.len() != expected {
            return Err(TilemapError::Allocation { what: "index bitmap", bytes: expected });
        }
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(expected)
            .map_err(|_| TilemapError::Allocation { what: "index bitmap", bytes: expected })?;
        pixels.extend_from_slice(data);

        log::debug!("image sink: '{label}' -> {}x{} bitmap", texels.x, texels.y);
        RgbaImage::from_raw(texels.x, texels.y, pixels)
            .ok_or(TilemapError::Allocation { what: "index bitmap", bytes: expected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_sink_maps_units_to_pixels() {
        let data = [0, 1, 0, 2, 0xFF, 0xFF, 0, 0];
        let img = ImageSink.upload_indices("m", UVec2::new(1, 2), &data).unwrap();
        assert_eq!(img.dimensions(), (1, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0, 1, 0, 2]);
        assert_eq!(img.get_pixel(0, 1).0, [0xFF, 0xFF, 0, 0]);
    }

    #[test]
    fn image_sink_rejects_mismatched_length() {
        assert!(ImageSink.upload_indices("m", UVec2::new(2, 2), &[0; 4]).is_err());
    }
}
